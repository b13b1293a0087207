//! Desktop IPC surface. Each command maps onto one bridge or catalog call;
//! errors cross to the webview as their display string.

pub mod catalog;
pub mod lists;
