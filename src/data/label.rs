use std::fmt;

/// Output class of a sample: an index into the network's final layer, or
/// `Undefined` when the class is unknown (unlabeled input, or a sample that
/// has not been scored yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Label {
    Class(usize),
    #[default]
    Undefined,
}

impl Label {
    pub fn index(self) -> Option<usize> {
        match self {
            Label::Class(i) => Some(i),
            Label::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Label::Class(_))
    }
}

impl From<usize> for Label {
    fn from(index: usize) -> Self {
        Label::Class(index)
    }
}

impl From<Option<usize>> for Label {
    fn from(index: Option<usize>) -> Self {
        index.map_or(Label::Undefined, Label::Class)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Class(i) => write!(f, "{i}"),
            Label::Undefined => write!(f, "undefined"),
        }
    }
}
