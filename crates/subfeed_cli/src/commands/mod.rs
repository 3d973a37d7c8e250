pub(crate) mod channels;
pub(crate) mod discover;
pub(crate) mod meta;
pub(crate) mod refresh;
pub(crate) mod shared;
pub(crate) mod uploads;
pub(crate) mod watched;
