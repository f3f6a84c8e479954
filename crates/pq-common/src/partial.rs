/// A three-valued outcome for work that can partially succeed.
///
/// Lexing a line may produce every token (`Ok`), some tokens before hitting
/// a problem (`Partial`), or nothing at all (`Err`). Callers that only care
/// about total success can flatten with [`PartialResult::ok`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum PartialResult<T, E> {
    Ok(T),
    Partial { value: T, error: E },
    Err(E),
}

impl<T, E> PartialResult<T, E> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// The value, if the work fully succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Partial { .. } | Self::Err(_) => None,
        }
    }

    /// The error, if any work failed.
    pub fn err(self) -> Option<E> {
        match self {
            Self::Ok(_) => None,
            Self::Partial { error, .. } => Some(error),
            Self::Err(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let ok: PartialResult<u32, &str> = PartialResult::Ok(1);
        assert!(ok.is_ok());
        assert_eq!(ok.ok(), Some(1));

        let partial: PartialResult<u32, &str> = PartialResult::Partial {
            value: 2,
            error: "late failure",
        };
        assert!(partial.is_partial());
        assert_eq!(partial.clone().ok(), None);
        assert_eq!(partial.err(), Some("late failure"));

        let err: PartialResult<u32, &str> = PartialResult::Err("early failure");
        assert!(err.is_err());
        assert_eq!(err.err(), Some("early failure"));
    }
}
