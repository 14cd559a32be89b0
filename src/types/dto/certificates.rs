use poem_openapi::Object;

#[derive(Object, Debug, Clone)]
pub struct GameRefDto {
    pub id: i32,
    pub name: String,
    pub version: Option<String>,
}

#[derive(Object, Debug, Clone)]
pub struct BoardRefDto {
    pub id: i32,
    pub name: String,
}

#[derive(Object, Debug, Clone)]
pub struct CabinetRefDto {
    pub id: i32,
    pub name: String,
}

/// Certificate with its game, board and cabinet set resolved
#[derive(Object, Debug)]
pub struct CertificateDto {
    pub id: i32,
    pub name: String,
    pub recognized_hr: bool,
    pub for_slovenia: bool,
    pub file_path: Option<String>,
    pub is_active: bool,
    pub game: GameRefDto,
    pub board: BoardRefDto,
    pub cabinets: Vec<CabinetRefDto>,
}

#[derive(Object, Debug)]
pub struct CreateCertificateRequest {
    pub name: String,
    pub recognized_hr: Option<bool>,
    pub for_slovenia: Option<bool>,
    pub file_path: Option<String>,
    pub game_id: i32,
    pub board_id: i32,
    pub cabinet_ids: Vec<i32>,
}

/// Partial update. Game and board are fixed at creation and cannot be
/// changed here; a present cabinet_ids replaces the whole cabinet set.
#[derive(Object, Debug)]
pub struct UpdateCertificateRequest {
    pub id: i32,
    pub recognized_hr: Option<bool>,
    pub for_slovenia: Option<bool>,
    pub file_path: Option<String>,
    pub is_active: Option<bool>,
    pub cabinet_ids: Option<Vec<i32>>,
}

#[derive(Object, Debug)]
pub struct JackpotDto {
    pub id: i32,
    pub game_id: i32,
    pub controller_id: i32,
    pub controller_name: Option<String>,
    pub initial_grand: Option<f64>,
    pub initial_major: Option<f64>,
    pub min_bet: Option<f64>,
    pub max_bet: Option<f64>,
    pub is_active: bool,
}

/// Game with its jackpot configurations
#[derive(Object, Debug)]
pub struct GameDto {
    pub id: i32,
    pub name: String,
    pub version: Option<String>,
    pub reno_id: Option<String>,
    pub is_active: bool,
    pub jackpots: Vec<JackpotDto>,
}

#[derive(Object, Debug)]
pub struct CreateGameRequest {
    pub name: String,
    pub version: Option<String>,
    pub reno_id: Option<String>,
}

#[derive(Object, Debug)]
pub struct UpdateGameRequest {
    pub id: i32,
    pub name: Option<String>,
    pub version: Option<String>,
    pub reno_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Object, Debug)]
pub struct CreateJackpotRequest {
    pub game_id: i32,
    pub controller_id: i32,
    pub initial_grand: Option<f64>,
    pub initial_major: Option<f64>,
    pub min_bet: Option<f64>,
    pub max_bet: Option<f64>,
}

#[derive(Object, Debug)]
pub struct UpdateJackpotRequest {
    pub id: i32,
    pub is_active: bool,
}
