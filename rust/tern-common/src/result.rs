//! The shared `Result` alias and the verification macros used at the
//! crates' validation boundaries.

pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Validates a caller-supplied argument, returning
/// `ErrorKind::InvalidArgument` naming the argument and the violated
/// condition. Only usable in functions returning [`Result`].
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::error::Error::invalid_arg(
                stringify!($name),
                concat!("condition failed: ", stringify!($cond)),
            ));
        }
    };
}

/// Validates decoded storage state, returning `ErrorKind::InvalidFormat`
/// naming the element and the violated condition.
#[macro_export]
macro_rules! verify_data {
    ($element:expr, $cond:expr) => {
        if !$cond {
            return Err($crate::error::Error::invalid_format(
                stringify!($element),
                concat!("condition failed: ", stringify!($cond)),
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check(flag: bool) -> super::Result<()> {
        crate::verify_arg!(flag, flag);
        Ok(())
    }

    fn decode(len: usize) -> super::Result<()> {
        crate::verify_data!(payload, len >= 4);
        Ok(())
    }

    #[test]
    fn verify_arg_reports_invalid_argument() {
        assert!(check(true).is_ok());
        let err = check(false).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidArgument { name, .. } if name == "flag"
        ));
    }

    #[test]
    fn verify_data_reports_invalid_format() {
        assert!(decode(8).is_ok());
        let err = decode(0).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidFormat { element, .. } if element == "payload"
        ));
    }
}
