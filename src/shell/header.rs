//! Header bar: module switcher and sidebar toggle

use crate::core::action::{Action, UiPatch};
use crate::core::entity::Module;
use crate::core::store::Store;
use crate::core::url::{HistoryMode, Location, UrlSync};

/// Landing path of each module
pub fn module_path(module: Module) -> &'static str {
    match module {
        Module::Dashboard => "/dashboard",
        Module::Production => "/production",
        Module::Financial => "/financial/treeview",
    }
}

/// Make `module` active and navigate to its landing page
pub fn switch_module(store: &mut Store, sync: &mut UrlSync, module: Module) {
    store.dispatch(Action::Set(UiPatch::module(module)));
    sync.open(store, Location::new(module_path(module), ""), HistoryMode::Push);
}

pub fn toggle_sidebar(store: &mut Store) {
    let show = store.state().ui.sidebar_show;
    store.dispatch(Action::Set(UiPatch {
        sidebar_show: Some(!show),
        ..Default::default()
    }));
}
