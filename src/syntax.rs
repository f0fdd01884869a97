//! Go validation and declaration outline on top of the tree-sitter Go grammar.
//!
//! The grammar is more permissive than the Go compiler's parser in a few
//! places a type expression can reach; `check_parameter_lists` covers those.

use arborium_tree_sitter::{Language, Node, Parser};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    fn at(node: Node<'_>, message: impl Into<String>) -> Self {
        let start = node.start_position();
        Self {
            line: start.row + 1,
            column: start.column + 1,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load the Go grammar: {0}")]
pub struct GrammarError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    pub imports: Vec<String>,
    pub types: Vec<TypeDecl>,
    pub funcs: Vec<FuncDecl>,
}

impl SourceFile {
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }

    /// Finds a function, or a method when `receiver` names the receiver's base type.
    pub fn func(&self, receiver: Option<&str>, name: &str) -> Option<&FuncDecl> {
        self.funcs
            .iter()
            .find(|decl| decl.name == name && decl.receiver.as_deref() == receiver)
    }

    /// Plain functions in declaration order.
    pub fn constructors(&self) -> Vec<&str> {
        self.funcs
            .iter()
            .filter(|decl| decl.receiver.is_none())
            .map(|decl| decl.name.as_str())
            .collect()
    }
}

/// A type spec; `kind` is the grammar's node kind (`struct_type`, `map_type`, ...)
/// and `text`/`fields` have their whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: String,
    pub text: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub receiver: Option<String>,
    pub name: String,
    pub params: Vec<String>,
    pub result: Option<String>,
}

impl FuncDecl {
    pub fn signature(&self) -> String {
        let mut signature = format!("({})", self.params.join(", "));
        if let Some(result) = &self.result {
            signature.push(' ');
            signature.push_str(result);
        }
        signature
    }
}

pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self, GrammarError> {
        let language: Language = arborium_go::language().into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|err| GrammarError(err.to_string()))?;
        Ok(Self { parser })
    }

    /// Parses a whole file, rejecting it at the first syntax error.
    pub fn parse(&mut self, source: &str) -> Result<SourceFile, SyntaxError> {
        let tree = self.parser.parse(source, None).ok_or_else(|| SyntaxError {
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;
        let root = tree.root_node();
        if let Some(node) = first_error(root) {
            return Err(describe_error(node, source));
        }
        check_parameter_lists(root)?;
        outline(root, source)
    }
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

fn flatten(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn describe_error(node: Node<'_>, source: &str) -> SyntaxError {
    if node.is_missing() {
        return SyntaxError::at(node, format!("missing '{}'", node.kind()));
    }
    let found: String = flatten(text(node, source)).chars().take(32).collect();
    if found.is_empty() {
        SyntaxError::at(node, "unexpected end of input")
    } else {
        SyntaxError::at(node, format!("unexpected '{found}'"))
    }
}

fn is_parameter(node: &Node<'_>) -> bool {
    matches!(
        node.kind(),
        "parameter_declaration" | "variadic_parameter_declaration"
    )
}

/// Rejects mixed named and unnamed parameters and non-final variadics,
/// which the grammar accepts.
fn check_parameter_lists(node: Node<'_>) -> Result<(), SyntaxError> {
    if node.kind() == "parameter_list" {
        let params: Vec<_> = named_children(node)
            .into_iter()
            .filter(is_parameter)
            .collect();
        let named = params
            .iter()
            .filter(|param| param.child_by_field_name("name").is_some())
            .count();
        if named != 0 && named != params.len() {
            return Err(SyntaxError::at(node, "mixed named and unnamed parameters"));
        }
        if let Some(position) = params
            .iter()
            .position(|param| param.kind() == "variadic_parameter_declaration")
            && position + 1 != params.len()
        {
            return Err(SyntaxError::at(
                params[position],
                "can only use ... with final parameter in list",
            ));
        }
    }

    for child in named_children(node) {
        check_parameter_lists(child)?;
    }
    Ok(())
}

fn outline(root: Node<'_>, source: &str) -> Result<SourceFile, SyntaxError> {
    let mut package = None;
    let mut imports = Vec::new();
    let mut types = Vec::new();
    let mut funcs = Vec::new();

    for node in named_children(root) {
        match node.kind() {
            "package_clause" => {
                let name = named_children(node)
                    .first()
                    .map(|ident| text(*ident, source))
                    .unwrap_or_default();
                if name == "_" {
                    return Err(SyntaxError::at(node, "invalid package name _"));
                }
                package = Some(name.to_string());
            }
            "import_declaration" => collect_imports(node, source, &mut imports),
            "type_declaration" => types.extend(
                named_children(node)
                    .into_iter()
                    .filter(|spec| matches!(spec.kind(), "type_spec" | "type_alias"))
                    .map(|spec| type_decl(spec, source)),
            ),
            "function_declaration" | "method_declaration" => funcs.push(func_decl(node, source)),
            _ => {}
        }
    }

    let package = package.ok_or_else(|| SyntaxError::at(root, "expected 'package'"))?;
    Ok(SourceFile {
        package,
        imports,
        types,
        funcs,
    })
}

fn collect_imports(node: Node<'_>, source: &str, imports: &mut Vec<String>) {
    for child in named_children(node) {
        match child.kind() {
            "import_spec" => {
                if let Some(path) = child.child_by_field_name("path") {
                    imports.push(text(path, source).trim_matches(['"', '`']).to_string());
                }
            }
            "import_spec_list" => collect_imports(child, source, imports),
            _ => {}
        }
    }
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> String {
    node.child_by_field_name(field)
        .map(|child| flatten(text(child, source)))
        .unwrap_or_default()
}

fn type_decl(spec: Node<'_>, source: &str) -> TypeDecl {
    let ty = spec.child_by_field_name("type");
    let fields = ty
        .filter(|ty| ty.kind() == "struct_type")
        .map(|ty| {
            named_children(ty)
                .into_iter()
                .filter(|list| list.kind() == "field_declaration_list")
                .flat_map(named_children)
                .filter(|field| field.kind() == "field_declaration")
                .map(|field| flatten(text(field, source)))
                .collect()
        })
        .unwrap_or_default();

    TypeDecl {
        name: field_text(spec, "name", source),
        kind: ty.map(|ty| ty.kind().to_string()).unwrap_or_default(),
        text: field_text(spec, "type", source),
        fields,
    }
}

fn func_decl(node: Node<'_>, source: &str) -> FuncDecl {
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| named_children(list).into_iter().find(is_parameter))
        .and_then(|param| param.child_by_field_name("type"))
        .map(|ty| receiver_base(text(ty, source)));
    let params = node
        .child_by_field_name("parameters")
        .map(|list| {
            named_children(list)
                .into_iter()
                .filter(is_parameter)
                .map(|param| flatten(text(param, source)))
                .collect()
        })
        .unwrap_or_default();

    FuncDecl {
        receiver,
        name: field_text(node, "name", source),
        params,
        result: node
            .child_by_field_name("result")
            .map(|result| flatten(text(result, source))),
    }
}

/// `*box[T]` -> `box`
fn receiver_base(ty: &str) -> String {
    let ty = ty.trim_start_matches(['*', '(']).trim_end_matches(')');
    ty.split('[').next().unwrap_or(ty).trim().to_string()
}
