use super::*;

const TS: &str = "[2024.05.01-12.00.00:000][ 12]";

fn modify_line(page: u32, slot: u32, item: u64, qty: u32) -> String {
    format!(
        "{TS}GameLog: Display: [Game] BagMgr@:Modfy BagItem PageId = {page} SlotId = {slot} ConfigBaseId = {item} Num = {qty}\n"
    )
}

fn init_line(page: u32, slot: u32, item: u64, qty: u32) -> String {
    format!(
        "{TS}GameLog: Display: [Game] BagMgr@:InitBagData PageId = {page} SlotId = {slot} ConfigBaseId = {item} Num = {qty}\n"
    )
}

fn price_exchange(syn_id: u64, item: u64, values: &[f64]) -> String {
    let mut text = format!(
        "{TS}GameLog: Display: [Game] ----Socket SendMessage STT----XchgSearchPrice----SynId = {syn_id}\n\
         {TS}GameLog: Display: [Game] +filters+1+refer [{item}]\n\
         {TS}GameLog: Display: [Game] ----Socket RecvMessage STT----XchgSearchPrice----SynId = {syn_id}\n\
         {TS}GameLog: Display: [Game] \n"
    );
    for (i, v) in values.iter().enumerate() {
        text.push_str(&format!("+{} [{}]\n", i + 1, v));
    }
    text.push_str(&format!("{TS}GameLog: Display: [Game] ----Socket RecvMessage STT----Ping\n"));
    text
}

// slot writes
#[test]
fn test_extract_slot_writes() {
    let text = format!(
        "{}{}noise line\n{}",
        modify_line(102, 3, 5028, 17),
        modify_line(102, 4, 5028, 2),
        modify_line(103, 0, 100300, 940)
    );
    let writes = LogTextParser::new().extract_slot_writes(&text);

    assert_eq!(
        writes,
        vec![
            SlotWrite::new(102, 3, 5028, 17),
            SlotWrite::new(102, 4, 5028, 2),
            SlotWrite::new(103, 0, 100300, 940),
        ]
    );
}

#[test]
fn test_slot_writes_ignore_bulk_init_lines() {
    let text = format!("{}{}", init_line(102, 0, 5028, 3), modify_line(102, 1, 7001, 1));
    let parser = LogTextParser::new();

    assert_eq!(parser.extract_slot_writes(&text), vec![SlotWrite::new(102, 1, 7001, 1)]);
    assert_eq!(parser.extract_bulk_init_writes(&text), vec![SlotWrite::new(102, 0, 5028, 3)]);
}

#[test]
fn test_crlf_line_endings() {
    let text = modify_line(102, 3, 5028, 17).replace('\n', "\r\n");
    let writes = LogTextParser::new().extract_slot_writes(&text);
    assert_eq!(writes, vec![SlotWrite::new(102, 3, 5028, 17)]);
}

#[test]
fn test_truncated_line_yields_nothing() {
    let full = modify_line(102, 3, 5028, 17);
    let cut = &full[..full.find(" Num").unwrap()];
    assert!(LogTextParser::new().extract_slot_writes(cut).is_empty());
}

#[test]
fn test_marker_without_game_prefix_is_ignored() {
    let text = "BagMgr@:Modfy BagItem PageId = 102 SlotId = 3 ConfigBaseId = 5028 Num = 17\n";
    assert!(LogTextParser::new().extract_slot_writes(text).is_empty());
}

#[test]
fn test_non_numeric_field_is_skipped() {
    let text = format!(
        "{TS}GameLog: Display: [Game] BagMgr@:Modfy BagItem PageId = 102 SlotId = x ConfigBaseId = 5028 Num = 17\n"
    );
    assert!(LogTextParser::new().extract_slot_writes(&text).is_empty());
}

#[test]
fn test_slot_writes_split_around_sort_dump() {
    let text = format!(
        "{}{}{}{}{}",
        modify_line(102, 1, 7001, 1),
        modify_line(102, 2, 7001, 2),
        init_line(102, 0, 5028, 3),
        init_line(102, 1, 7001, 1),
        modify_line(102, 5, 5028, 4)
    );
    let chunk = LogTextParser::new().parse_chunk(&text);

    assert_eq!(chunk.slot_writes.len(), 3);
    assert_eq!(chunk.slot_writes_before_bulk_init, 2);
    assert_eq!(chunk.slot_writes_after_bulk_init(), &[SlotWrite::new(102, 5, 5028, 4)]);

    let plain = LogTextParser::new().parse_chunk(&modify_line(102, 1, 7001, 1));
    assert_eq!(plain.slot_writes_before_bulk_init, 0);
    assert_eq!(plain.slot_writes_after_bulk_init().len(), 1);
}

// price quotes
#[test]
fn test_price_quote_average() {
    let text = price_exchange(77, 5028, &[1.0, 2.0, 4.0]);
    let quotes = LogTextParser::new().extract_price_quotes(&text);

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].item_id, ItemId(5028));
    assert_eq!(quotes[0].price, 2.3333);
}

#[test]
fn test_price_quote_caps_samples() {
    // first 30 samples are 1.0, the remaining 15 would drag the mean up
    let values: Vec<f64> = (0..45).map(|i| if i < 30 { 1.0 } else { 100.0 }).collect();
    let text = price_exchange(9, 5028, &values);
    let quotes = LogTextParser::new().extract_price_quotes(&text);

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].price, 1.0);
}

#[test]
fn test_price_quote_without_samples_is_unknown() {
    let text = price_exchange(5, 5028, &[]);
    let quotes = LogTextParser::new().extract_price_quotes(&text);

    assert_eq!(quotes.len(), 1);
    assert!(quotes[0].is_unknown());
    assert_eq!(quotes[0].price, UNKNOWN_PRICE);
}

#[test]
fn test_price_quote_pending_response() {
    let full = price_exchange(5, 5028, &[3.0]);
    let request_only = &full[..full.find("----Socket RecvMessage").unwrap()];
    assert!(LogTextParser::new().extract_price_quotes(request_only).is_empty());
}

#[test]
fn test_price_quote_skips_base_currency() {
    let text = price_exchange(5, EXEMPT_ITEM_ID, &[1.0]);
    assert!(LogTextParser::new().extract_price_quotes(&text).is_empty());
}

#[test]
fn test_price_quotes_keyed_by_syn_id() {
    let text = format!(
        "{}{}",
        price_exchange(11, 5028, &[2.0, 2.0]),
        price_exchange(12, 7001, &[10.0, 20.0])
    );
    let quotes = LogTextParser::new().extract_price_quotes(&text);

    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes[0].item_id, ItemId(5028));
    assert_eq!(quotes[0].price, 2.0);
    assert_eq!(quotes[1].item_id, ItemId(7001));
    assert_eq!(quotes[1].price, 15.0);
}

// scene markers
#[test]
fn test_detect_map_enter_and_exit_independently() {
    let parser = LogTextParser::new();
    let enter = format!("{TS}GameLog: Display: [Game] {}/02KD/Map.Map'\n", markers::MAP_ENTER);
    let exit = format!(
        "{TS}GameLog: Display: [Game] PageApplyBase@ _UpdateGameEnd: LastSceneName = World'/Game/Art/Maps/02KD/Map.Map' {}\n",
        markers::MAP_EXIT
    );

    assert_eq!(
        parser.detect_map_transition(&enter),
        MapTransition { entering: true, exiting: false }
    );
    assert_eq!(
        parser.detect_map_transition(&exit),
        MapTransition { entering: false, exiting: true }
    );

    let both = format!("{enter}{exit}");
    assert_eq!(
        parser.detect_map_transition(&both),
        MapTransition { entering: true, exiting: true }
    );
}

#[test]
fn test_detect_login() {
    let parser = LogTextParser::new();
    assert!(parser.detect_login("[..]GameLog: Display: [Game] PlayerInitPkgMgr begin"));
    assert!(parser.detect_login("Login2Client ok"));
    assert!(!parser.detect_login(&modify_line(1, 1, 1, 1)));
}

#[test]
fn test_parse_chunk_collects_everything() {
    let text = format!(
        "{}{}{}",
        modify_line(102, 3, 5028, 17),
        init_line(102, 0, 7001, 1),
        price_exchange(3, 5028, &[0.5])
    );
    let chunk = LogTextParser::new().parse_chunk(&text);

    assert_eq!(chunk.slot_writes.len(), 1);
    assert_eq!(chunk.bulk_init_writes.len(), 1);
    assert_eq!(chunk.price_quotes.len(), 1);
    assert!(!chunk.login_detected);
    assert!(!chunk.is_empty());
    assert!(LogTextParser::new().parse_chunk("").is_empty());
}
