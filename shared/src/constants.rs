//! Field names and defaults shared by every pipeline stage.

/// Field that carries an unparsable log line in a fallback document.
pub const RAW_MESSAGE_FIELD: &str = "raw_message";

pub const DEFAULT_STORE_ENDPOINT: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "cloudtrail-events";
pub const DEFAULT_PLAYBOOK_TARGET: &str = "mctlab-playbook";
pub const DEFAULT_REGION: &str = "us-east-1";

/// Most recent matches requested per detector run.
pub const DEFAULT_RESULT_CAP: usize = 50;

// ── audit event fields ──────────────────────────────────────────────────────
pub const EVENT_NAME_FIELD: &str = "eventName";
pub const CONSOLE_LOGIN_RESULT_FIELD: &str = "responseElements.ConsoleLogin";
pub const TIMESTAMP_FIELD: &str = "@timestamp";
pub const SOURCE_IP_FIELD: &str = "sourceIPAddress";
pub const USER_IDENTITY_FIELD: &str = "userIdentity";
pub const ARN_FIELD: &str = "arn";
pub const REQUEST_PARAMETERS_FIELD: &str = "requestParameters";
pub const ACCESS_KEY_FIELD: &str = "accessKeyId";
pub const INSTANCE_ID_FIELDS: [&str; 2] = ["instanceId", "instance_id"];
