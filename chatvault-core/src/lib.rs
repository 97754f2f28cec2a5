mod client;

pub use client::{FileListPage, Paging, RemoteFile, SlackClient, SlackError};
