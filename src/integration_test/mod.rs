mod api;
mod test_util;
