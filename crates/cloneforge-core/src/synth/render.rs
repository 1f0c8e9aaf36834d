use crate::synth::{GeneratedMethod, Statement, ValueCopy, Visibility};
use std::fmt::Write as _;

const INDENT: &str = "    ";
const LOCAL: &str = "p";
const ELEMENT: &str = "element";

/// Accessor for a field under bean naming, e.g. `getFirstName`. Only the
/// first character is capitalised; the rest of the name is kept verbatim.
#[must_use]
pub fn accessor(prefix: &str, field: &str) -> String {
    let mut chars = field.chars();
    let Some(first) = chars.next() else {
        return prefix.to_string();
    };

    let mut out = String::with_capacity(prefix.len() + field.len());
    out.push_str(prefix);
    out.extend(first.to_uppercase());
    out.push_str(chars.as_str());

    out
}

impl GeneratedMethod {
    /// Declaration line without the opening brace, e.g. `public Person copy()`.
    #[must_use]
    pub fn signature(&self) -> String {
        let visibility = match self.visibility {
            Visibility::Public => "public",
        };
        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("{} arg{i}", ty.simple_display()))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{visibility} {} {}({params})",
            self.return_type.simple_name(),
            self.name
        )
    }

    /// Body lines relative to the method's own indentation.
    #[must_use]
    pub fn body_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for statement in &self.statements {
            match statement {
                Statement::NewInstance { ty } => {
                    let ty = ty.simple_name();
                    lines.push(format!("{ty} {LOCAL} = new {ty}();"));
                }
                Statement::CopyElements {
                    field,
                    element,
                    copy,
                } => {
                    let getter = accessor("get", field);
                    lines.push(format!(
                        "for ({} {ELEMENT} : this.{getter}()) {{",
                        element.simple_display()
                    ));
                    lines.push(format!(
                        "{INDENT}{LOCAL}.{getter}().add({});",
                        self.value(ELEMENT, *copy)
                    ));
                    lines.push("}".to_string());
                }
                Statement::Assign { field, copy } => {
                    let source = format!("this.{}()", accessor("get", field));
                    lines.push(format!(
                        "{LOCAL}.{}({});",
                        accessor("set", field),
                        self.value(&source, *copy)
                    ));
                }
                Statement::Return => lines.push(format!("return {LOCAL};")),
            }
        }

        lines
    }

    /// Full method text, ending with a newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{} {{\n", self.signature());
        for line in self.body_lines() {
            let _ = writeln!(out, "{INDENT}{line}");
        }
        out.push_str("}\n");

        out
    }

    fn value(&self, source: &str, copy: ValueCopy) -> String {
        match copy {
            ValueCopy::Value | ValueCopy::Alias => source.to_string(),
            ValueCopy::Deep => format!("{source}.{}()", self.name),
        }
    }
}
