/// The reference-data tables that share generic CRUD plus a block guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryKind {
    LocationType,
    CabinetPosition,
    KeyType,
    Board,
    Cabinet,
    Game,
    Controller,
    Certificate,
}

impl DictionaryKind {
    /// Query-string name used by the dictionary endpoints.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "location-type" => Some(DictionaryKind::LocationType),
            "position" => Some(DictionaryKind::CabinetPosition),
            "key-type" => Some(DictionaryKind::KeyType),
            "board" => Some(DictionaryKind::Board),
            "cabinet" => Some(DictionaryKind::Cabinet),
            "game" => Some(DictionaryKind::Game),
            "controller" => Some(DictionaryKind::Controller),
            "certificate" => Some(DictionaryKind::Certificate),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DictionaryKind::LocationType => "location type",
            DictionaryKind::CabinetPosition => "cabinet position",
            DictionaryKind::KeyType => "key type",
            DictionaryKind::Board => "board",
            DictionaryKind::Cabinet => "cabinet",
            DictionaryKind::Game => "game",
            DictionaryKind::Controller => "controller",
            DictionaryKind::Certificate => "certificate",
        }
    }

    /// Table name recorded in audit entries for this kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            DictionaryKind::LocationType => "location_types",
            DictionaryKind::CabinetPosition => "cabinet_positions",
            DictionaryKind::KeyType => "key_types",
            DictionaryKind::Board => "board_definitions",
            DictionaryKind::Cabinet => "cabinet_definitions",
            DictionaryKind::Game => "game_definitions",
            DictionaryKind::Controller => "controller_definitions",
            DictionaryKind::Certificate => "certificate_definitions",
        }
    }
}
