use crate::TypeExpr;

/// What a single token of an argument is coerced into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text,
    Integer,
    Float,
    Boolean,
    /// Legal member names of an enumeration.
    Enumerated(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Scalar(Scalar),
    Sequence(Scalar),
    /// Accepted as raw text.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: Kind,
    pub optional: bool,
}

impl Classification {
    pub fn is_enumerated(&self) -> bool {
        matches!(
            self.kind,
            Kind::Scalar(Scalar::Enumerated(_)) | Kind::Sequence(Scalar::Enumerated(_))
        )
    }
}

/// Reduces a declared type to the shape the option synthesizer works with.
///
/// Never fails: anything outside the supported shapes is `Unrecognized`.
pub fn classify(ty: &TypeExpr) -> Classification {
    let res = match unwrap_optional(ty) {
        Some(inner) => Classification { kind: classify_kind(inner), optional: true },
        None => Classification { kind: classify_kind(ty), optional: false },
    };
    tracing::trace!(?ty, ?res, "classified");
    res
}

fn unwrap_optional(ty: &TypeExpr) -> Option<&TypeExpr> {
    match ty {
        TypeExpr::Union(alts) => match alts.as_slice() {
            [TypeExpr::Unit, TypeExpr::Unit] => None,
            [inner, TypeExpr::Unit] | [TypeExpr::Unit, inner] => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn classify_kind(ty: &TypeExpr) -> Kind {
    if let TypeExpr::List(elem) = ty {
        return match scalar(elem) {
            Some(it) => Kind::Sequence(it),
            None => Kind::Unrecognized,
        };
    }
    match scalar(ty) {
        Some(it) => Kind::Scalar(it),
        None => Kind::Unrecognized,
    }
}

fn scalar(ty: &TypeExpr) -> Option<Scalar> {
    let res = match ty {
        TypeExpr::Enum(it) => Scalar::Enumerated(it.members.clone()),
        TypeExpr::Bool => Scalar::Boolean,
        TypeExpr::Int => Scalar::Integer,
        TypeExpr::Float => Scalar::Float,
        TypeExpr::Str => Scalar::Text,
        TypeExpr::List(_) | TypeExpr::Union(_) | TypeExpr::Unit | TypeExpr::Named(_) => {
            return None
        }
    };
    Some(res)
}
