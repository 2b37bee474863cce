pub const COLLECTIONS: &str = "collections";
pub const CARDS: &str = "cards";
pub const CARD_DUE_INDEX: &str = "card_due_index";
pub const DUE_DIGESTS: &str = "due_digests";
pub const CONFIG_VERSIONS: &str = "config_versions";
