//! Column alias tables.
//!
//! Snapshots exported at different times name the same field differently
//! (`salesChannel`, `saleschannel`, `channel`). Each entity carries one
//! priority-ordered alias list per field, and every component resolves
//! fields through [`first_match`] instead of probing names itself.

use serde_json::{Map, Value};

/// One flattened snapshot row: dotted column name to cell value.
pub type RawRecord = Map<String, Value>;

/// Priority-ordered list of column names for one logical field.
pub type Aliases = &'static [&'static str];

/// Returns the first alias holding a non-null value in `record`.
pub fn first_match<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|value| !value.is_null())
}

pub mod order {
    use super::Aliases;

    pub const ID: Aliases = &["id", "orderid", "orderId", "_id"];
    pub const STORE: Aliases = &["store.name", "storename", "storeName", "store"];
    pub const CHANNEL: Aliases = &["saleschannel", "salesChannel", "channel"];
    pub const AMOUNT: Aliases = &[
        "total.orderamount",
        "total.orderAmount",
        "totalamount",
        "totalAmount",
        "total",
    ];
    pub const PREP_TIME: Aliases = &["preparationtime", "preparationTime"];
    pub const CREATED_AT: Aliases = &[
        "createdat",
        "createdAt",
        "orderdate",
        "orderDate",
        "created_at",
        "date",
    ];
}

pub mod customer {
    use super::Aliases;

    pub const ID: Aliases = &["id", "customerid", "customerId", "_id"];
    pub const LAST_ORDER: Aliases = &["lastOrder", "lastorder", "last_order"];
    pub const TOTAL_SPENT: Aliases = &["totalSpent", "totalspent"];
    pub const AVG_TICKET: Aliases = &["avgTicket", "avgticket"];
    pub const VIP: Aliases = &["isVIP", "isvip"];
    pub const CHURN_RISK: Aliases = &["churnRisk", "churnrisk"];
    pub const SEGMENT: Aliases = &["segment"];
    pub const STATUS: Aliases = &["status"];
}

pub mod campaign {
    use super::Aliases;

    pub const ID: Aliases = &["id", "campaignid", "campaignId", "_id"];
    pub const NAME: Aliases = &["name", "title"];
    pub const STORE: Aliases = &["store.name", "storename", "storeName", "store"];
    pub const CHANNEL: Aliases = &[
        "salesChannel",
        "saleschannel",
        "channel",
        "deliveryChannel",
        "deliverychannel",
    ];
    pub const KIND: Aliases = &["type", "campaignType", "campaigntype"];
    pub const BADGE: Aliases = &["badge"];
    pub const HOUR: Aliases = &["hour"];
    pub const CONVERSION: Aliases = &["conversionRate", "conversionrate", "conversion"];
    pub const SENT: Aliases = &["sent", "messagesSent", "messagessent"];
    pub const DELIVERED: Aliases = &["delivered", "messagesDelivered", "messagesdelivered"];
    pub const SENT_AT: Aliases = &[
        "sendTime",
        "sendtime",
        "createdAt",
        "createdat",
        "sentAt",
        "sentat",
        "created_at",
        "scheduledAt",
        "scheduledat",
    ];
}

pub mod queue {
    use super::Aliases;

    pub const CAMPAIGN_ID: Aliases = &["campaignid", "campaignId", "campaign.id"];
    pub const RESPONSE: Aliases = &["response"];
}
