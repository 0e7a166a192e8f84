mod item_category;

pub use item_category::{ItemCategory, category_for_type};

/// Line markers emitted by the game client into `UE_game.log`.
pub mod markers {
    /// Prefix every structured game line carries before its payload.
    pub const GAME_LINE: &str = "GameLog: Display: [Game] ";
    /// Per-mutation slot write: `BagMgr@:Modfy BagItem PageId = P SlotId = S ConfigBaseId = I Num = Q`
    pub const BAG_MODIFY: &str = "BagMgr@:Modfy BagItem PageId = ";
    /// Bulk dump written only by the in-game sort/refresh action.
    pub const BAG_INIT: &str = "BagMgr@:InitBagData PageId = ";

    pub const SLOT_ID: &str = " SlotId = ";
    pub const CONFIG_BASE_ID: &str = " ConfigBaseId = ";
    pub const NUM: &str = " Num = ";

    pub const PRICE_REQUEST: &str = "XchgSearchPrice----SynId = ";
    pub const PRICE_RESPONSE: &str = "----Socket RecvMessage STT----XchgSearchPrice----SynId = ";
    pub const RESPONSE_BOUNDARY: &str = "----Socket RecvMessage STT----";
    pub const PRICE_REFER: &str = "+refer [";

    // leaving the hideout scene for any other map
    pub const MAP_ENTER: &str = "PageApplyBase@ _UpdateGameEnd: LastSceneName = World'/Game/Art/Maps/01SD/XZ_YuJinZhiXiBiNanSuo200/XZ_YuJinZhiXiBiNanSuo200.XZ_YuJinZhiXiBiNanSuo200' NextSceneName = World'/Game/Art/Maps";
    // travelling back into the hideout
    pub const MAP_EXIT: &str = "NextSceneName = World'/Game/Art/Maps/01SD/XZ_YuJinZhiXiBiNanSuo200/XZ_YuJinZhiXiBiNanSuo200.XZ_YuJinZhiXiBiNanSuo200'";

    pub const LOGIN: [&str; 2] = ["PlayerInitPkgMgr", "Login2Client"];
}

/// Item id of the base currency. Prices are quoted in it, so it is never
/// price-searched and never taxed.
pub const EXEMPT_ITEM_ID: u64 = 100300;

/// Factor applied to market value when the trade tax setting is on (12.5% tax).
pub const TAX_RATE: f64 = 0.875;

/// Maximum number of listings averaged per price search response.
pub const PRICE_SAMPLE_SIZE: usize = 30;

/// Bulk-init entries required before a sort dump is accepted as a full bag.
pub const MIN_BAG_ITEMS_FOR_INIT: usize = 20;

/// Slot writes the legacy bootstrap must exceed to adopt the ledger.
pub const MIN_BAG_ITEMS_LEGACY: usize = 10;

/// Sentinel price for a search response that carried no listings.
pub const UNKNOWN_PRICE: f64 = -1.0;
