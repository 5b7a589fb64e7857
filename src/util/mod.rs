pub(crate) mod output;
pub(crate) mod utils_for_test;
