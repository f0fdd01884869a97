use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::ir::{GenerationRequest, TypeEntry};

const SOURCE_HEADER: &str = r#"// Code generated by go-lazy; DO NOT EDIT.

package {{ package }}

import (
	"sync"
	"sync/atomic"
)
"#;

const SOURCE_ENTRY: &str = r#"
// lazy{{ name }} implements lazy evaluation for {{ type_doc }}.
type lazy{{ name }} struct {
	v {{ type }}
	f func() {{ type }}
	m sync.Mutex
	o uint32
}

// Get returns the cached value, calling f on first use.
func (v *lazy{{ name }}) Get() {{ type }} {
	if atomic.LoadUint32(&v.o) == 1 {
		return v.v
	}

	v.m.Lock()
	defer v.m.Unlock()

	if v.o == 0 {
		v.v = v.f()
		v.f = nil
		atomic.StoreUint32(&v.o, 1)
	}
	return v.v
}

// {{ name }} provides lazy evaluation for {{ type_doc }}. f is called exactly
// once, when the result is first used.
func {{ name }}(f func() {{ type }}) func() {{ type }} {
	return (&lazy{{ name }}{f: f}).Get
}
"#;

const TEST_HEADER: &str = r#"// Code generated by go-lazy; DO NOT EDIT.

package {{ package }}

import (
	"sync"
	"sync/atomic"
	"testing"
)
"#;

const TEST_ENTRY: &str = r#"
func TestLazy_{{ name }}(t *testing.T) {
	newLazy := {{ name }}

	var calls int32
	get := newLazy(func() {{ type }} {
		atomic.AddInt32(&calls, 1)
		var zero {{ type }}
		return zero
	})

	start := make(chan struct{})
	var wg sync.WaitGroup
	for i := 0; i < 64; i++ {
		wg.Add(1)
		go func() {
			defer wg.Done()
			<-start
			get()
		}()
	}
	close(start)
	wg.Wait()

	if n := atomic.LoadInt32(&calls); n != 1 {
		t.Fatalf("{{ name }}: f called %d times, want 1", n)
	}
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template {template}: unclosed placeholder at byte {offset}")]
    Unclosed { template: String, offset: usize },
    #[error("template {template}: unknown slot `{slot}`")]
    UnknownSlot { template: String, slot: String },
    #[error("template {template}: slot `{slot}` is not bound here")]
    Unbound { template: String, slot: Slot },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Package,
    Name,
    Type,
    /// The type with whitespace collapsed, safe inside a line comment.
    TypeDoc,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "package" => Some(Self::Package),
            "name" => Some(Self::Name),
            "type" => Some(Self::Type),
            "type_doc" => Some(Self::TypeDoc),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Package => "package",
            Self::Name => "name",
            Self::Type => "type",
            Self::TypeDoc => "type_doc",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// Values visible to a template while it renders.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    package: Option<&'a str>,
    entry: Option<&'a TypeEntry>,
}

impl<'a> Scope<'a> {
    pub fn file(package: &'a str) -> Self {
        Self {
            package: Some(package),
            entry: None,
        }
    }

    pub fn entry(entry: &'a TypeEntry) -> Self {
        Self {
            package: None,
            entry: Some(entry),
        }
    }

    fn value(&self, slot: Slot) -> Option<Cow<'a, str>> {
        match slot {
            Slot::Package => self.package.map(Cow::Borrowed),
            Slot::Name => self.entry.map(|entry| Cow::Borrowed(entry.name.as_str())),
            Slot::Type => self
                .entry
                .map(|entry| Cow::Borrowed(entry.type_expr.as_str())),
            Slot::TypeDoc => self.entry.map(|entry| {
                Cow::Owned(
                    entry
                        .type_expr
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" "),
                )
            }),
        }
    }
}

/// A skeleton split into literal text and `{{ slot }}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| TemplateError::Unclosed {
                template: name.to_string(),
                offset: consumed + start,
            })?;
            let slot_name = after_open[..end].trim();
            let slot = Slot::from_name(slot_name).ok_or_else(|| TemplateError::UnknownSlot {
                template: name.to_string(),
                slot: slot_name.to_string(),
            })?;
            segments.push(Segment::Slot(slot));

            let advance = start + 2 + end + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn render_into(&self, scope: &Scope<'_>, out: &mut String) -> Result<(), TemplateError> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    let value = scope.value(*slot).ok_or_else(|| TemplateError::Unbound {
                        template: self.name.clone(),
                        slot: *slot,
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(())
    }

    pub fn render(&self, scope: &Scope<'_>) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.render_into(scope, &mut out)?;
        Ok(out)
    }
}

/// Renders the wrapper source file: header, then one block per entry in order.
pub fn render_source(request: &GenerationRequest) -> Result<String, TemplateError> {
    render_document(("lazy.go", SOURCE_HEADER), ("impl", SOURCE_ENTRY), request)
}

/// Renders the companion race test, one test function per entry.
pub fn render_race_test(request: &GenerationRequest) -> Result<String, TemplateError> {
    render_document(("lazy_test.go", TEST_HEADER), ("test", TEST_ENTRY), request)
}

fn render_document(
    header: (&str, &str),
    entry: (&str, &str),
    request: &GenerationRequest,
) -> Result<String, TemplateError> {
    let header = Template::parse(header.0, header.1)?;
    let entry = Template::parse(entry.0, entry.1)?;

    let mut out = header.render(&Scope::file(&request.package))?;
    for type_entry in &request.entries {
        entry.render_into(&Scope::entry(type_entry), &mut out)?;
    }
    Ok(out)
}
