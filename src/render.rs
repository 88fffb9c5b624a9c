//! Markdown rendering of the conversation summary document.

use crate::extract::ConversationRecord;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::io::Write;

/// Write the full summary document: a header with the export timestamp and
/// total count, then one section per conversation in their original order,
/// separated by horizontal rules.
pub fn write_summary<W: Write>(
    writer: &mut W,
    records: &[ConversationRecord],
    exported_at: DateTime<Local>,
) -> std::io::Result<()> {
    writeln!(writer, "# Cursor Chat History Export")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "Exported on: {}",
        exported_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(writer)?;
    writeln!(writer, "Total conversations: {}", records.len())?;
    writeln!(writer)?;
    writeln!(writer, "---")?;
    writeln!(writer)?;

    for (i, record) in records.iter().enumerate() {
        write_section(writer, i + 1, record)?;
    }

    Ok(())
}

fn write_section<W: Write>(
    writer: &mut W,
    position: usize,
    record: &ConversationRecord,
) -> std::io::Result<()> {
    writeln!(writer, "## Conversation {position}")?;
    writeln!(writer)?;
    writeln!(writer, "**Bubble ID:** `{}`", record.bubble_id)?;
    writeln!(writer)?;
    writeln!(
        writer,
        "**Type:** {}",
        record.conversation_type.as_deref().unwrap_or("unknown")
    )?;
    writeln!(writer)?;
    writeln!(writer, "**Is Agentic:** {}", record.is_agentic)?;
    writeln!(writer)?;
    if !record.request_id.is_empty() {
        writeln!(writer, "**Request ID:** {}", record.request_id)?;
        writeln!(writer)?;
    }

    writeln!(writer, "**Metadata:**")?;
    for (name, count) in record.metadata.entries() {
        writeln!(writer, "- {name}: {count}")?;
    }
    writeln!(writer)?;

    if let Some(messages) = record.raw_data.get("messages").and_then(Value::as_array) {
        writeln!(writer, "**Messages:**")?;
        writeln!(writer)?;
        for msg in messages {
            let role = msg.get("role").and_then(Value::as_str).unwrap_or("unknown");
            let content = match msg.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            writeln!(writer, "**{role}:**")?;
            writeln!(writer, "{content}")?;
            writeln!(writer)?;
        }
    }

    writeln!(writer, "---")?;
    writeln!(writer)?;
    Ok(())
}
