//! Unit arithmetic rules (spec §4.4 "Unit arithmetic").

/// Two units are comparable for `==`/`!=`/`< <= > >=` when they are
/// identical or when one side is unit-less.
pub(crate) fn comparable(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, _) | (_, None) => true,
        (Some(a), Some(b)) => a == b,
    }
}

/// Addition/subtraction: units must be compatible (identical, or one side
/// unit-less); the result carries whichever unit is present.
pub(crate) fn additive_unit<'a>(a: Option<&'a str>, b: Option<&'a str>) -> Result<Option<&'a str>, ()> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(u), None) | (None, Some(u)) => Ok(Some(u)),
        (Some(u1), Some(u2)) if u1 == u2 => Ok(Some(u1)),
        _ => Err(()),
    }
}

/// Multiplication: the unit comes from whichever operand has one; both
/// having a unit is an error (spec says the product is otherwise ambiguous).
pub(crate) fn mul_unit<'a>(a: Option<&'a str>, b: Option<&'a str>) -> Result<Option<&'a str>, ()> {
    match (a, b) {
        (None, None) => Ok(None),
        (Some(u), None) | (None, Some(u)) => Ok(Some(u)),
        (Some(_), Some(_)) => Err(()),
    }
}

/// Division: the unit comes from the dividend, if any.
pub(crate) fn div_unit<'a>(a: Option<&'a str>, _b: Option<&'a str>) -> Option<&'a str> {
    a
}
