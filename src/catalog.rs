use crate::ir::TypeEntry;

/// Go's predeclared types plus the empty interface, in emission order.
pub const CATALOG: &[(&str, &str)] = &[
    ("Bool", "bool"),
    ("Byte", "byte"),
    ("Complex64", "complex64"),
    ("Complex128", "complex128"),
    ("Float32", "float32"),
    ("Float64", "float64"),
    ("Error", "error"),
    ("Int", "int"),
    ("Int8", "int8"),
    ("Int16", "int16"),
    ("Int32", "int32"),
    ("Int64", "int64"),
    ("Interface", "interface{}"),
    ("Rune", "rune"),
    ("String", "string"),
    ("Uint", "uint"),
    ("Uint8", "uint8"),
    ("Uint16", "uint16"),
    ("Uint32", "uint32"),
    ("Uint64", "uint64"),
    ("Uintptr", "uintptr"),
];

pub fn entries() -> Vec<TypeEntry> {
    CATALOG
        .iter()
        .map(|(name, type_expr)| TypeEntry::new(*name, *type_expr))
        .collect()
}
