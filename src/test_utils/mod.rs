#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod store;

pub(crate) use http::{assert_content_type, assert_status_ok, parse_json_body};
pub(crate) use store::{
    FailingCollection, TEST_TIMEZONE, get_test_collection, get_test_expense_store,
    get_test_state,
};
