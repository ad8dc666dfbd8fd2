use super::{CommandOutput, connect};
use crate::display::StatsFormatter;
use crate::error::Result;

/// Ticket counts per status, priority and category
pub async fn cmd_stats(output_json: bool) -> Result<()> {
    let summary = connect()?.statistics().await?;
    CommandOutput::new(serde_json::to_value(&summary)?)
        .with_text(StatsFormatter::format(&summary))
        .print(output_json)
}
