//! Arithmetic demo module
//!
//! A deliberately trivial stand-in for an application under test, used to
//! exercise the plain unit-test workflow next to the browser-driven one.

/// Add two numbers together
pub fn add(a: i64, b: i64) -> i64 {
    a + b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_positive_numbers() {
        assert_eq!(add(2, 3), 5);
    }

    #[test]
    fn test_add_negative_numbers() {
        assert_eq!(add(-4, -6), -10);
        assert_eq!(add(-4, 6), 2);
    }

    #[test]
    fn test_add_zero() {
        assert_eq!(add(0, 0), 0);
        assert_eq!(add(7, 0), 7);
    }
}
