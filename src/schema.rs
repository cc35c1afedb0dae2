use serde::{Serialize, Deserialize};
use serde_json::Value;

// ------------------------------------------------------------
// Subscription request
// ------------------------------------------------------------
//
// Sent exactly once per session, immediately after the socket
// opens. The feed expects:
//
// {
//   "type": "subscribe",
//   "product_ids": [...],
//   "channels": [{ "name": "ticker", "product_ids": [...] }]
// }
//
// The instrument order is taken from configuration and preserved
// verbatim in both lists.
//
#[derive(Debug, Serialize, Clone)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    kind: &'static str,

    product_ids: Vec<String>,

    channels: Vec<ChannelRequest>,
}

/// One channel descriptor inside a subscription request.
#[derive(Debug, Serialize, Clone)]
pub struct ChannelRequest {
    name: &'static str,

    product_ids: Vec<String>,
}

impl SubscribeRequest {
    /// Builds a ticker-channel subscription for the given instruments.
    ///
    /// CONTRACT:
    /// - Built once per collector run, resent on every reopen
    /// - `instruments` must come straight from configuration
    pub fn ticker(instruments: &[String]) -> Self {
        Self {
            kind: "subscribe",
            product_ids: instruments.to_vec(),
            channels: vec![ChannelRequest {
                name: "ticker",
                product_ids: instruments.to_vec(),
            }],
        }
    }
}

// ------------------------------------------------------------
// Inbound frame classification
// ------------------------------------------------------------
//
// The feed multiplexes several message kinds over one socket
// (ticker updates, subscription acks, heartbeats, errors). Only
// ticker updates are persisted; everything else is dropped
// without side effect.
//
#[derive(Debug)]
pub enum FeedMessage {
    /// A ticker update selected for persistence.
    Ticker(TickerEvent),

    /// Any frame whose `type` is absent or not `ticker`.
    ///
    /// IMPORTANT:
    /// - Filtered silently, exactly like the ack/heartbeat
    ///   traffic it usually is
    Other,
}

impl FeedMessage {
    /// Classifies one raw text frame.
    ///
    /// RETURNS:
    /// - `Ok(Ticker)` for a well-formed ticker update
    /// - `Ok(Other)` when the discriminant is missing or different
    /// - `Err` when the frame is not JSON, or a ticker payload
    ///   carries mistyped fields
    ///
    /// Errors here must never unwind past the read loop: the
    /// caller logs, counts and drops the frame.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let v: Value = serde_json::from_str(raw)?;

        if !matches!(v.get("type").and_then(Value::as_str), Some("ticker")) {
            return Ok(Self::Other);
        }

        let event: TickerEvent = serde_json::from_value(v)?;
        Ok(Self::Ticker(event))
    }
}

// ------------------------------------------------------------
// Ticker event
// ------------------------------------------------------------
//
// The subset of the feed's ticker payload that ends up in the
// output file. Every field is optional: the feed omits fields on
// some frames (the first ticker after subscribe has no trade
// side, for instance) and an absent field must still produce a
// record.
//
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TickerEvent {
    /// Monotonic per instrument, not globally.
    pub sequence: Option<u64>,

    /// Instrument identifier, e.g. "BTC-EUR".
    pub product_id: Option<String>,

    /// Last trade price as string.
    ///
    /// DESIGN DECISION:
    /// Price-like fields stay strings end to end; the collector
    /// never parses them, so no float precision is lost on disk.
    pub price: Option<String>,

    /// Best bid price as string.
    pub best_bid: Option<String>,

    /// Best ask price as string.
    pub best_ask: Option<String>,

    /// Taker side of the last trade: "buy" or "sell".
    pub side: Option<String>,

    /// Feed-supplied ISO-8601 timestamp.
    pub time: Option<String>,

    /// Exchange trade identifier.
    pub trade_id: Option<u64>,
}

impl TickerEvent {
    /// Renders the event as one output record.
    ///
    /// IMPORTANT:
    /// - The field order below is the on-disk contract; never
    ///   reorder it
    /// - Missing fields become empty strings
    /// - No escaping: feed values are comma-free
    pub fn to_record(&self) -> String {
        let sequence = self.sequence.map(|n| n.to_string()).unwrap_or_default();
        let trade_id = self.trade_id.map(|n| n.to_string()).unwrap_or_default();

        let mut line = [
            sequence.as_str(),
            self.product_id.as_deref().unwrap_or(""),
            self.price.as_deref().unwrap_or(""),
            self.best_bid.as_deref().unwrap_or(""),
            self.best_ask.as_deref().unwrap_or(""),
            self.side.as_deref().unwrap_or(""),
            self.time.as_deref().unwrap_or(""),
            trade_id.as_str(),
        ]
        .join(",");

        line.push('\n');
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_event() -> TickerEvent {
        TickerEvent {
            sequence: Some(3),
            product_id: Some("BTC-EUR".to_string()),
            price: Some("50000.1".to_string()),
            best_bid: Some("50000.0".to_string()),
            best_ask: Some("50000.2".to_string()),
            side: Some("buy".to_string()),
            time: Some("2024-01-01T00:00:00Z".to_string()),
            trade_id: Some(42),
        }
    }

    #[test]
    fn record_field_order_is_fixed() {
        assert_eq!(
            full_event().to_record(),
            "3,BTC-EUR,50000.1,50000.0,50000.2,buy,2024-01-01T00:00:00Z,42\n"
        );
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let event = TickerEvent {
            product_id: Some("ETH-EUR".to_string()),
            price: Some("2000.5".to_string()),
            ..Default::default()
        };
        assert_eq!(event.to_record(), ",ETH-EUR,2000.5,,,,,\n");
    }

    #[test]
    fn all_fields_missing_still_produces_a_record() {
        assert_eq!(TickerEvent::default().to_record(), ",,,,,,,\n");
    }

    #[test]
    fn ticker_frame_is_classified_as_ticker() {
        let raw = r#"{"type":"ticker","sequence":7,"product_id":"BTC-EUR","price":"100.0","best_bid":"99.9","best_ask":"100.1","side":"sell","time":"2024-01-01T00:00:00Z","trade_id":9}"#;
        match FeedMessage::parse(raw).unwrap() {
            FeedMessage::Ticker(event) => {
                assert_eq!(event.sequence, Some(7));
                assert_eq!(event.product_id.as_deref(), Some("BTC-EUR"));
                assert_eq!(event.trade_id, Some(9));
            }
            other => panic!("expected ticker, got {other:?}"),
        }
    }

    #[test]
    fn unknown_payload_fields_are_ignored() {
        let raw = r#"{"type":"ticker","product_id":"BTC-EUR","price":"1.0","volume_24h":"123.4","open_24h":"0.9"}"#;
        assert!(matches!(
            FeedMessage::parse(raw).unwrap(),
            FeedMessage::Ticker(_)
        ));
    }

    #[test]
    fn non_ticker_frames_are_filtered() {
        let ack = r#"{"type":"subscriptions","channels":[{"name":"ticker","product_ids":["BTC-EUR"]}]}"#;
        assert!(matches!(FeedMessage::parse(ack).unwrap(), FeedMessage::Other));

        let heartbeat = r#"{"type":"heartbeat","sequence":90}"#;
        assert!(matches!(
            FeedMessage::parse(heartbeat).unwrap(),
            FeedMessage::Other
        ));
    }

    #[test]
    fn frame_without_discriminant_is_filtered_not_an_error() {
        let raw = r#"{"sequence":1,"product_id":"BTC-EUR"}"#;
        assert!(matches!(FeedMessage::parse(raw).unwrap(), FeedMessage::Other));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(FeedMessage::parse("not json at all").is_err());
        assert!(FeedMessage::parse("{\"type\":\"ticker\"").is_err());
    }

    #[test]
    fn mistyped_ticker_payload_is_an_error() {
        // sequence must be numeric when present
        let raw = r#"{"type":"ticker","sequence":"three","product_id":"BTC-EUR"}"#;
        assert!(FeedMessage::parse(raw).is_err());
    }

    #[test]
    fn subscribe_request_matches_feed_wire_shape() {
        let instruments = vec!["BTC-EUR".to_string(), "ETH-EUR".to_string()];
        let request = SubscribeRequest::ticker(&instruments);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "type": "subscribe",
                "product_ids": ["BTC-EUR", "ETH-EUR"],
                "channels": [
                    {
                        "name": "ticker",
                        "product_ids": ["BTC-EUR", "ETH-EUR"]
                    }
                ]
            })
        );
    }
}
