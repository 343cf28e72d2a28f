use std::sync::{Mutex, MutexGuard};

use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::slot_utils::generate_time_slots;
use crate::board::types::ColorStyle;
use crate::board::{
    Board, CellField, Color, DragSession, DragSource, EditTarget, LinkSession, LinkToggle, PoolEntry,
    PoolKind, ScheduleEntry, SurnameCounters, TableId,
};
use crate::config::Settings;
use crate::export::export_table_to_string;
use crate::store::{AutosaveHandle, BoardSnapshot, SaveEnvelope};
use crate::table_view::{DayGroup, TableView};

/// Shared state of the server: the board itself, the autosave feed, and the
/// blob held by the built-in `/api/store` endpoint
pub struct AppState {
    pub board: Mutex<Board>,
    pub autosave: Option<AutosaveHandle>,
    pub blob: Mutex<BoardSnapshot>,
}

impl AppState {
    pub fn new(board: Board, autosave: Option<AutosaveHandle>) -> Self {
        Self {
            board: Mutex::new(board),
            autosave,
            blob: Mutex::new(BoardSnapshot::default()),
        }
    }

    fn board(&self) -> Result<MutexGuard<'_, Board>> {
        self.board
            .lock()
            .map_err(|_| actix_web::error::ErrorInternalServerError("board lock poisoned"))
    }

    /// Queues a save when a mutation changed the board
    fn persist(&self, board: &Board, changed: bool) {
        if !changed {
            return;
        }
        if let Some(autosave) = &self.autosave {
            if !autosave.schedule(board.to_snapshot()) {
                tracing::warn!("autosave task is gone, change not persisted");
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BoardView<'a> {
    table1: &'a [ScheduleEntry],
    table2: &'a [ScheduleEntry],
    reserve: &'a [PoolEntry],
    weekend: &'a [PoolEntry],
    other_jobs: &'a [PoolEntry],
    surname_counters: &'a SurnameCounters,
    drag: &'a DragSession,
    link: Option<&'a LinkSession>,
}

impl<'a> BoardView<'a> {
    fn of(board: &'a Board) -> Self {
        Self {
            table1: board.table(TableId::Table1),
            table2: board.table(TableId::Table2),
            reserve: board.pool(PoolKind::Reserve),
            weekend: board.pool(PoolKind::Weekend),
            other_jobs: board.pool(PoolKind::OtherJobs),
            surname_counters: board.counters(),
            drag: board.drag_session(),
            link: board.link_session(),
        }
    }
}

#[derive(Serialize)]
struct TableResponse<'a> {
    table: TableId,
    title: &'static str,
    groups: Vec<DayGroup<'a>>,
}

#[derive(Serialize)]
struct ColorOption {
    color: Color,
    #[serde(flatten)]
    style: ColorStyle,
}

#[derive(Serialize)]
struct Outcome {
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl Outcome {
    fn of(changed: bool) -> Self {
        Self { changed, id: None }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct SurnamesQuery {
    date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct DropOnPoolRequest {
    pool: PoolKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOnSlotRequest {
    table: TableId,
    row_id: String,
    #[serde(default)]
    to_secondary: bool,
}

#[derive(Deserialize)]
pub struct PoolItemRequest {
    pool: PoolKind,
    id: String,
}

#[derive(Deserialize)]
pub struct AddPoolEntryRequest {
    surname: String,
}

#[derive(Deserialize)]
pub struct EditRequest {
    target: EditTarget,
    field: CellField,
    value: String,
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({"success": false, "error": message}))
}

// Board endpoints
async fn get_board(state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board()?;
    Ok(HttpResponse::Ok().json(BoardView::of(&board)))
}

async fn search(query: web::Query<SearchQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board()?;
    Ok(HttpResponse::Ok().json(board.search(&query.q)))
}

async fn get_table(
    path: web::Path<String>,
    query: web::Query<SearchQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(table) = TableId::parse(&path) else {
        return Ok(bad_request(format!("unknown table '{}'", path.as_str())));
    };
    let board = state.board()?;
    let groups = TableView::new(table).day_groups(&board, &query.q);
    Ok(HttpResponse::Ok().json(TableResponse {
        table,
        title: table.title(),
        groups,
    }))
}

async fn export_table(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let Some(table) = TableId::parse(&path) else {
        return Ok(bad_request(format!("unknown table '{}'", path.as_str())));
    };
    let board = state.board()?;
    let csv = export_table_to_string(&board, table)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to export table: {}", e)))?;
    Ok(HttpResponse::Ok().content_type("text/csv; charset=utf-8").body(csv))
}

async fn surnames(query: web::Query<SurnamesQuery>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let board = state.board()?;
    let surnames = board.surnames(query.date);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "total": surnames.len(),
        "surnames": surnames,
    })))
}

/// Choices offered by the cell editors
async fn options() -> Result<HttpResponse> {
    let colors: Vec<ColorOption> = Color::ALL
        .iter()
        .map(|&color| ColorOption {
            color,
            style: color.style(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "colors": colors,
        "times": generate_time_slots(),
    })))
}

// Drag and drop
async fn begin_drag(req: web::Json<DragSource>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let started = board.begin_drag(req.into_inner());
    Ok(HttpResponse::Ok().json(serde_json::json!({"started": started, "drag": board.drag_session()})))
}

async fn drop_on_pool(req: web::Json<DropOnPoolRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let changed = board.complete_drop_on_pool(req.pool);
    board.end_drag();
    state.persist(&board, changed);
    Ok(HttpResponse::Ok().json(Outcome::of(changed)))
}

async fn drop_on_slot(req: web::Json<DropOnSlotRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let mut view = TableView::new(req.table);
    let changed = if req.to_secondary {
        view.drop_on_secondary(&mut board, &req.row_id)
    } else {
        view.drop_on_row(&mut board, &req.row_id)
    };
    state.persist(&board, changed);
    Ok(HttpResponse::Ok().json(Outcome::of(changed)))
}

async fn end_drag(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.board()?.end_drag();
    Ok(HttpResponse::Ok().json(Outcome::of(false)))
}

// Links
async fn toggle_link(req: web::Json<PoolItemRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let result = board.toggle_link(req.pool, &req.id);
    state.persist(&board, result == LinkToggle::Linked);
    Ok(HttpResponse::Ok().json(serde_json::json!({"result": result, "link": board.link_session()})))
}

async fn unlink(req: web::Json<PoolItemRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let changed = board.unlink(req.pool, &req.id);
    state.persist(&board, changed);
    Ok(HttpResponse::Ok().json(Outcome::of(changed)))
}

// Rows and entries
async fn add_pool_entry(
    path: web::Path<String>,
    req: web::Json<AddPoolEntryRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some(pool) = PoolKind::parse(&path) else {
        return Ok(bad_request(format!("unknown pool '{}'", path.as_str())));
    };
    let mut board = state.board()?;
    match board.add_pool_entry(pool, &req.surname) {
        Some(id) => {
            state.persist(&board, true);
            Ok(HttpResponse::Ok().json(Outcome {
                changed: true,
                id: Some(id),
            }))
        }
        None => Ok(bad_request("surname is required".to_string())),
    }
}

async fn add_row(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let Some(table) = TableId::parse(&path) else {
        return Ok(bad_request(format!("unknown table '{}'", path.as_str())));
    };
    let mut board = state.board()?;
    let id = TableView::new(table).add_row(&mut board);
    state.persist(&board, true);
    Ok(HttpResponse::Ok().json(Outcome {
        changed: true,
        id: Some(id),
    }))
}

async fn delete_row(path: web::Path<(String, String)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (table_name, row_id) = path.into_inner();
    let Some(table) = TableId::parse(&table_name) else {
        return Ok(bad_request(format!("unknown table '{}'", table_name)));
    };
    let mut board = state.board()?;
    if !TableView::new(table).delete_row(&mut board, &row_id) {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"success": false, "error": "Row not found"})));
    }
    state.persist(&board, true);
    Ok(HttpResponse::Ok().json(Outcome::of(true)))
}

async fn edit_cell(req: web::Json<EditRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut board = state.board()?;
    let changed = board.edit_cell(&req.target, req.field, &req.value);
    state.persist(&board, changed);
    Ok(HttpResponse::Ok().json(Outcome::of(changed)))
}

// Blob store: GET returns what was saved, POST takes {"data": {...}}
async fn get_store(state: web::Data<AppState>) -> Result<HttpResponse> {
    let blob = state
        .blob
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("store lock poisoned"))?;
    Ok(HttpResponse::Ok().json(&*blob))
}

async fn post_store(req: web::Json<SaveEnvelope>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut blob = state
        .blob
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("store lock poisoned"))?;
    let incoming = req.into_inner().data;
    *blob = incoming.or(std::mem::take(&mut *blob));
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
}

// HTML page handlers
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

/// Registers every route; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/api/board", web::get().to(get_board))
        .route("/api/search", web::get().to(search))
        .route("/api/surnames", web::get().to(surnames))
        .route("/api/options", web::get().to(options))
        .route("/api/drag/begin", web::post().to(begin_drag))
        .route("/api/drag/end", web::post().to(end_drag))
        .route("/api/drop/pool", web::post().to(drop_on_pool))
        .route("/api/drop/slot", web::post().to(drop_on_slot))
        .route("/api/link/toggle", web::post().to(toggle_link))
        .route("/api/link/unlink", web::post().to(unlink))
        .route("/api/edit", web::post().to(edit_cell))
        .route("/api/pools/{pool}", web::post().to(add_pool_entry))
        .service(web::resource("/api/tables/{table}").route(web::get().to(get_table)))
        .service(web::resource("/api/tables/{table}/export.csv").route(web::get().to(export_table)))
        .service(web::resource("/api/tables/{table}/rows").route(web::post().to(add_row)))
        .service(web::resource("/api/tables/{table}/rows/{id}").route(web::delete().to(delete_row)))
        .service(
            web::resource("/api/store")
                .route(web::get().to(get_store))
                .route(web::post().to(post_store)),
        );
}

pub async fn start_server(settings: &Settings, app_state: web::Data<AppState>) -> std::io::Result<()> {
    let static_dir = settings.static_dir.clone();
    tracing::info!(bind = %settings.bind_addr, "starting web server");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", static_dir.clone()))
            .configure(configure)
    })
    .bind(settings.bind_addr.as_str())?
    .run()
    .await
}
