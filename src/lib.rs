//! # cursor-chat-export
//!
//! A CLI tool that exports [Cursor](https://cursor.com) AI chat history to local
//! JSON and Markdown files.
//!
//! ## What it does
//!
//! Cursor stores AI conversations in a SQLite key-value database (`state.vscdb`)
//! under the `cursorDiskKV` table, one JSON blob per `bubbleId:<id>` key. This tool
//! reads that database, decodes each conversation, and writes:
//!
//! - `all_conversations.json` — every conversation, reshaped with its identifier,
//!   type, agentic flag and context-collection counts, plus the full decoded value.
//! - `conversations_summary.md` — a readable Markdown summary, one section per
//!   conversation, including the messages when present.
//! - `message_contexts.json` — the `messageRequestContext:<id>` entries, passed
//!   through unmodified (only written when any exist).
//!
//! The database is opened **read-only** — your data is never modified. If the main
//! database is missing, the `.backup` copy Cursor keeps next to it is used instead.
//!
//! A malformed record never aborts an export: it is skipped with a diagnostic on
//! stderr and the remaining records are still written.
//!
//! ## Usage
//!
//! ```sh
//! # Export to ./chat-history-export
//! cursor-chat-export
//!
//! # Custom output directory and DB path
//! cursor-chat-export ~/notes/cursor-chats --db /path/to/state.vscdb
//! ```
//!
//! Preferences can be persisted in `~/.config/cursor-chat-export/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks Cursor's internal (undocumented) SQLite layout. If a Cursor update
//! breaks the key scheme, please open an issue.

pub mod export;
pub mod extract;
pub mod render;
pub mod store;
