//! Curl multi event loop: perform, wait, messages; settle completed handles
//! and keep the active set filled up to the connection cap.

use anyhow::Result;
use std::time::Duration;

use super::handler::BodyHandler;
use super::{Begin, FetchSummary, SegmentFetcher};

type ActiveItem = (curl::multi::Easy2Handle<BodyHandler>, u64);

/// Drive one fetch per index through a single multi handle. Segments settled
/// in `begin` (skips, bad handles) never occupy a slot.
pub(super) fn run_multi(
    fetcher: &SegmentFetcher<'_>,
    indices: impl Iterator<Item = u64>,
    max_connections: usize,
) -> Result<FetchSummary> {
    let max_connections = max_connections.max(1);
    let mut multi = curl::multi::Multi::new();
    multi
        .set_max_total_connections(max_connections)
        .map_err(|e| anyhow::anyhow!("curl multi max connections: {}", e))?;

    let mut pending = indices;
    let mut active: Vec<ActiveItem> = Vec::new();
    let mut summary = FetchSummary::default();

    refill_active(&multi, fetcher, max_connections, &mut active, &mut pending, &mut summary)?;

    while !active.is_empty() {
        let running = multi
            .perform()
            .map_err(|e| anyhow::anyhow!("curl multi perform: {}", e))?;

        let mut completed: Vec<(usize, Result<(), curl::Error>)> = Vec::new();
        multi.messages(|msg| {
            for (i, (handle, _)) in active.iter().enumerate() {
                if let Some(res) = msg.result_for2(handle) {
                    completed.push((i, res));
                    break;
                }
            }
        });
        completed.sort_by(|a, b| b.0.cmp(&a.0));
        for (i, transfer) in completed {
            let (handle, index) = active.remove(i);
            let mut easy = multi
                .remove2(handle)
                .map_err(|e| anyhow::anyhow!("curl multi remove: {}", e))?;
            let response = transfer.and_then(|()| easy.response_code());
            let body = easy.get_mut().take_body();
            let outcome = fetcher.finish(index, response, &body);
            summary.record(&outcome);
        }

        refill_active(&multi, fetcher, max_connections, &mut active, &mut pending, &mut summary)?;

        if running > 0 {
            multi
                .wait(&mut [], Duration::from_millis(100))
                .map_err(|e| anyhow::anyhow!("curl multi wait: {}", e))?;
        }
    }

    Ok(summary)
}

/// Start pending segments until `max_connections` transfers are active or
/// nothing is left to schedule.
fn refill_active(
    multi: &curl::multi::Multi,
    fetcher: &SegmentFetcher<'_>,
    max_connections: usize,
    active: &mut Vec<ActiveItem>,
    pending: &mut impl Iterator<Item = u64>,
    summary: &mut FetchSummary,
) -> Result<()> {
    while active.len() < max_connections {
        let Some(index) = pending.next() else {
            break;
        };
        match fetcher.begin(index) {
            Begin::Settled(outcome) => summary.record(&outcome),
            Begin::Request(easy) => {
                let handle = multi
                    .add2(easy)
                    .map_err(|e| anyhow::anyhow!("curl multi add: {}", e))?;
                active.push((handle, index));
            }
        }
    }
    Ok(())
}
