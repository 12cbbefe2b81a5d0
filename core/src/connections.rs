//! Connection-history queries and the summary layout shared by every
//! connection view.

use crate::error::LookupError;
use crate::model::ConnectionView;
use crate::model::LoginTriplet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionQuery {
    ByCkeyFull,
    ByAllCidsFull,
    ByAllIpsFull,
}

impl ConnectionQuery {
    pub const ALL: [ConnectionQuery; 3] = [
        ConnectionQuery::ByCkeyFull,
        ConnectionQuery::ByAllCidsFull,
        ConnectionQuery::ByAllIpsFull,
    ];

    pub fn path(self) -> &'static str {
        match self {
            ConnectionQuery::ByCkeyFull => "/Connections/Ckey",
            ConnectionQuery::ByAllCidsFull => "/Connections/FullByAllCid",
            ConnectionQuery::ByAllIpsFull => "/Connections/FullByAllIps",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConnectionQuery::ByCkeyFull => "View Full Connection History",
            ConnectionQuery::ByAllCidsFull => "View Full Connections By All CIDs",
            ConnectionQuery::ByAllIpsFull => "View Full Connections By All IPs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryItem {
    Group { label: &'static str, values: String },
    Separator,
}

/// Expandable groups for whichever aggregate lists are present and
/// non-empty, with a separator between neighbouring groups only.
pub fn summary_groups(view: &ConnectionView) -> Vec<SummaryItem> {
    let groups = [
        ("View All CKEYs", view.all_ckeys.as_deref()),
        ("View All CIDs", view.all_cids.as_deref()),
        ("View All IPs", view.all_ips.as_deref()),
    ];

    let mut items = Vec::new();
    for (label, values) in groups {
        let Some(values) = values.filter(|values| !values.is_empty()) else {
            continue;
        };
        if !items.is_empty() {
            items.push(SummaryItem::Separator);
        }
        items.push(SummaryItem::Group {
            label,
            values: values.join(", "),
        });
    }
    items
}

/// State of one open connection view.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionPanel {
    Loading,
    Loaded(ConnectionView),
    Failed(String),
}

impl ConnectionPanel {
    pub fn from_result(result: Result<ConnectionView, LookupError>) -> Self {
        match result {
            Ok(view) => ConnectionPanel::Loaded(view),
            Err(err) => {
                tracing::warn!("connection history fetch failed: {err}");
                ConnectionPanel::Failed(err.summary())
            }
        }
    }

    pub fn triplets(&self) -> &[LoginTriplet] {
        match self {
            ConnectionPanel::Loaded(view) => view.triplets.as_deref().unwrap_or_default(),
            ConnectionPanel::Loading | ConnectionPanel::Failed(_) => &[],
        }
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, ConnectionPanel::Failed(_))
    }
}
