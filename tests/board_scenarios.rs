use chrono::NaiveDate;
use duty_board::board::{
    Board, BoardPolicy, CellField, Color, CounterEffect, CounterPolicy, DragSource, EditTarget,
    LinkToggle, PoolKind, SlotPosition, TableId,
};
use duty_board::store::BoardSnapshot;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn seeded() -> Board {
    Board::seeded(date("2025-01-20"), BoardPolicy::default())
}

fn with_reserve(board: &mut Board, reserve: serde_json::Value) {
    let snapshot: BoardSnapshot = serde_json::from_value(serde_json::json!({ "reserve": reserve })).unwrap();
    board.apply_snapshot(snapshot);
}

fn links_are_mutual(board: &Board) -> bool {
    PoolKind::ALL.iter().all(|&pool| {
        board.pool(pool).iter().all(|e| match &e.linked_id {
            None => true,
            Some(l) => board
                .pool_entry(pool, l)
                .is_some_and(|p| p.linked_id.as_deref() == Some(e.id.as_str())),
        })
    })
}

fn set_row(board: &mut Board, table: TableId, id: &str, field: CellField, value: &str) {
    let target = EditTarget::Row {
        table,
        id: id.to_string(),
    };
    assert!(board.edit_cell(&target, field, value));
}

#[test]
fn reserve_entry_dropped_on_empty_slot() {
    let mut board = seeded();
    with_reserve(
        &mut board,
        serde_json::json!([{"id": "r1", "surname": "Ivanov", "color": "red", "counter": 0}]),
    );

    assert!(board.begin_drag(DragSource::Pool {
        pool: PoolKind::Reserve,
        id: "r1".into(),
    }));
    assert!(board.complete_drop_on_slot(TableId::Table1, "t1-5", false));

    let row = board.row(TableId::Table1, "t1-5").unwrap();
    assert_eq!(row.surname, "Ivanov");
    assert_eq!(row.color, Color::Red);
    assert_eq!(row.counter, 0);
    assert!(board.pool(PoolKind::Reserve).is_empty());
    assert!(!board.drag_session().is_active());
}

#[test]
fn two_clicks_link_reserve_entries() {
    let mut board = seeded();
    with_reserve(
        &mut board,
        serde_json::json!([
            {"id": "r1", "surname": "Ivanov", "color": "red"},
            {"id": "r2", "surname": "Petrov", "color": "blue"}
        ]),
    );

    assert_eq!(board.toggle_link(PoolKind::Reserve, "r1"), LinkToggle::Opened);
    assert_eq!(board.toggle_link(PoolKind::Reserve, "r2"), LinkToggle::Linked);
    assert_eq!(board.partner(PoolKind::Reserve, "r1").unwrap().id, "r2");
    assert_eq!(board.partner(PoolKind::Reserve, "r2").unwrap().id, "r1");
    assert!(board.is_canonical(PoolKind::Reserve, "r1"));
    assert!(board.link_session().is_none());

    assert!(board.unlink(PoolKind::Reserve, "r2"));
    assert!(board.partner(PoolKind::Reserve, "r1").is_none());
    assert!(links_are_mutual(&board));
}

#[test]
fn search_is_case_insensitive_substring() {
    let mut board = seeded();
    board.add_pool_entry(PoolKind::Reserve, "Ivanov");
    set_row(&mut board, TableId::Table2, "t2-3", CellField::Surname, "Petrov");

    let hits = board.search("OV");
    assert_eq!(hits.pool(PoolKind::Reserve).len(), 1);
    assert_eq!(hits.table(TableId::Table2)[0].id, "t2-3");
    assert!(board.search("xyz").is_empty());
}

#[test]
fn row_after_day_end_rolls_to_next_day() {
    let mut board = Board::seeded(date("2025-01-18"), BoardPolicy::default());
    let last = board.table(TableId::Table1).last().unwrap();
    assert_eq!((last.date, last.time.to_string().as_str()), (date("2025-01-20"), "17:45"));

    let id = board.add_schedule_row(TableId::Table1);
    let row = board.row(TableId::Table1, &id).unwrap();
    assert_eq!(row.date, date("2025-01-21"));
    assert_eq!(row.time.to_string(), "00:00");
}

#[test]
fn deleting_a_double_row_makes_a_linked_reserve_pair() {
    let mut board = seeded();
    set_row(&mut board, TableId::Table1, "t1-7", CellField::Surname, "Ivanov");
    set_row(&mut board, TableId::Table1, "t1-7", CellField::Surname2, "Petrov");
    let before = board.table(TableId::Table1).len();

    assert!(board.delete_schedule_row(TableId::Table1, "t1-7"));
    assert_eq!(board.table(TableId::Table1).len(), before);
    assert!(board.row(TableId::Table1, "t1-7").is_none());

    let reserve = board.pool(PoolKind::Reserve);
    assert_eq!(reserve.len(), 2);
    assert_eq!(reserve[0].surname, "Ivanov");
    assert_eq!(reserve[0].counter, 1);
    assert_eq!(reserve[1].surname, "Petrov");
    assert_eq!(board.partner(PoolKind::Reserve, &reserve[0].id).unwrap().surname, "Petrov");
    assert_eq!(board.counters().get("Petrov"), 1);
}

#[test]
fn deletion_counters_saturate_at_ceiling() {
    let policy = BoardPolicy {
        counters: CounterPolicy {
            ceiling: 2,
            ..CounterPolicy::default()
        },
        ..BoardPolicy::default()
    };
    let mut board = Board::seeded(date("2025-01-20"), policy);
    for id in ["t1-1", "t1-2", "t1-3"] {
        set_row(&mut board, TableId::Table1, id, CellField::Surname, "Ivanov");
        board.delete_schedule_row(TableId::Table1, id);
    }
    assert_eq!(board.counters().get("Ivanov"), 2);
    assert!(board.pool(PoolKind::Reserve).iter().all(|e| e.counter <= 2));
}

#[test]
fn linked_pair_moves_between_pools_together() {
    let mut board = seeded();
    with_reserve(
        &mut board,
        serde_json::json!([
            {"id": "r1", "surname": "Ivanov", "color": "red", "linkedId": "r2"},
            {"id": "r2", "surname": "Petrov", "color": "yellow", "linkedId": "r1"},
            {"id": "r3", "surname": "Sidorov", "color": "blue"}
        ]),
    );

    board.begin_drag(DragSource::Pool {
        pool: PoolKind::Reserve,
        id: "r2".into(),
    });
    assert!(board.complete_drop_on_pool(PoolKind::OtherJobs));

    let moved = board.pool(PoolKind::OtherJobs);
    assert_eq!(moved.len(), 2);
    assert_eq!((moved[0].surname.as_str(), moved[0].color), ("Ivanov", Color::Red));
    assert_eq!((moved[1].surname.as_str(), moved[1].color), ("Petrov", Color::Yellow));
    assert_eq!(moved[0].linked_id.as_deref(), Some(moved[1].id.as_str()));
    assert_eq!(board.pool(PoolKind::Reserve).len(), 1);
    assert!(links_are_mutual(&board));
}

#[test]
fn linked_pair_splits_over_a_slots_two_fields() {
    let mut board = seeded();
    with_reserve(
        &mut board,
        serde_json::json!([
            {"id": "r1", "surname": "Ivanov", "color": "red", "linkedId": "r2"},
            {"id": "r2", "surname": "Petrov", "color": "blue", "linkedId": "r1"}
        ]),
    );

    board.begin_drag(DragSource::Pool {
        pool: PoolKind::Reserve,
        id: "r2".into(),
    });
    assert!(board.complete_drop_on_slot(TableId::Table2, "t2-10", true));

    let row = board.row(TableId::Table2, "t2-10").unwrap();
    assert_eq!(row.surname2, "Petrov");
    assert_eq!(row.surname, "Ivanov");
    assert!(board.pool(PoolKind::Reserve).is_empty());
}

#[test]
fn slot_pair_dragged_to_weekend_becomes_linked() {
    let mut board = seeded();
    set_row(&mut board, TableId::Table1, "t1-2", CellField::Surname, "Ivanov");
    set_row(&mut board, TableId::Table1, "t1-2", CellField::Surname2, "Petrov");
    board.add_pool_entry(PoolKind::Reserve, "Ivanov");

    board.begin_drag(DragSource::Table {
        table: TableId::Table1,
        row_id: "t1-2".into(),
        slot: SlotPosition::Primary,
    });
    assert!(board.complete_drop_on_pool(PoolKind::Weekend));

    assert!(board.row(TableId::Table1, "t1-2").unwrap().is_vacant());
    let weekend = board.pool(PoolKind::Weekend);
    assert_eq!(weekend.len(), 2);
    assert!(board.partner(PoolKind::Weekend, &weekend[0].id).is_some());
    // withdrawn from the reserve when sent off the tables
    assert!(board.pool(PoolKind::Reserve).is_empty());
}

#[test]
fn reset_policy_clears_counter_on_arrival() {
    let policy = BoardPolicy {
        counters: CounterPolicy {
            weekend: CounterEffect::Reset,
            ..CounterPolicy::default()
        },
        ..BoardPolicy::default()
    };
    let mut board = Board::seeded(date("2025-01-20"), policy);
    with_reserve(
        &mut board,
        serde_json::json!([{"id": "r1", "surname": "Ivanov", "color": "red", "counter": 4}]),
    );
    board.begin_drag(DragSource::Pool {
        pool: PoolKind::Reserve,
        id: "r1".into(),
    });
    board.complete_drop_on_pool(PoolKind::Weekend);
    assert_eq!(board.pool(PoolKind::Weekend)[0].counter, 0);
    assert_eq!(board.counters().get("Ivanov"), 0);
}

#[test]
fn drops_without_a_drag_change_nothing() {
    let mut board = seeded();
    let before = board.to_snapshot();
    assert!(!board.complete_drop_on_pool(PoolKind::Reserve));
    assert!(!board.complete_drop_on_slot(TableId::Table1, "t1-1", false));
    assert!(!board.begin_drag(DragSource::Table {
        table: TableId::Table1,
        row_id: "t1-1".into(),
        slot: SlotPosition::Secondary,
    }));
    assert_eq!(board.to_snapshot(), before);
}

#[test]
fn snapshot_roundtrip_through_json() {
    let mut board = seeded();
    board.add_pool_entry(PoolKind::Weekend, "Ivanov");
    set_row(&mut board, TableId::Table1, "t1-1", CellField::Surname, "Petrov");

    let json = serde_json::to_string(&board.to_snapshot()).unwrap();
    let mut restored = Board::new(date("2025-02-01"), BoardPolicy::default());
    restored.apply_snapshot(serde_json::from_str(&json).unwrap());

    assert_eq!(restored.to_snapshot(), board.to_snapshot());
    assert_eq!(restored.add_pool_entry(PoolKind::Weekend, "Sidorov").as_deref(), Some("w2"));
}
