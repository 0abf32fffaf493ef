pub(crate) mod locale;
pub(crate) mod number;
