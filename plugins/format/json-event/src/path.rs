use std::fmt;

/// Dotted position in the decoded document, built on the stack while the
/// decoder descends and rendered only when an error needs it.
#[derive(Debug, Clone, Copy)]
pub enum FieldPath<'a> {
    Root,
    Child {
        parent: &'a FieldPath<'a>,
        name: &'a str,
    },
}

impl<'a> FieldPath<'a> {
    pub fn child(&'a self, name: &'a str) -> FieldPath<'a> {
        FieldPath::Child { parent: self, name }
    }
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Root => Ok(()),
            FieldPath::Child {
                parent: FieldPath::Root,
                name,
            } => f.write_str(name),
            FieldPath::Child { parent, name } => write!(f, "{parent}.{name}"),
        }
    }
}
