pub mod bridge;
pub mod catalog;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod context;
pub mod errors;
pub mod lists;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
mod desktop {
    use crate::commands;
    use crate::config::{self, AppConfig};
    use crate::context::AppContext;
    use tauri::{Manager, RunEvent};

    fn resolve_config(app: &tauri::App) -> AppConfig {
        let mut config = AppConfig::from_env();

        // Prefer the platform app-data dir unless the user picked a location.
        let user_chose_dir = std::env::var_os(config::DATA_DIR_ENV).is_some()
            || config.data_dir != config::get_data_dir();
        if !user_chose_dir {
            match app.path().app_data_dir() {
                Ok(dir) => config.data_dir = dir,
                Err(e) => log::warn!("No app data dir ({}), using {:?}", e, config.data_dir),
            }
        }

        config
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .plugin(tauri_plugin_opener::init())
            .setup(|app| {
                let config = resolve_config(app);
                let context = tauri::async_runtime::block_on(AppContext::startup(config))?;
                app.manage(context);
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                commands::lists::get_watchlist,
                commands::lists::add_to_watchlist,
                commands::lists::remove_from_watchlist,
                commands::lists::update_watchlist,
                commands::lists::get_readinglist,
                commands::lists::add_to_readinglist,
                commands::lists::remove_from_readinglist,
                commands::lists::get_favorites,
                commands::lists::add_to_favorites,
                commands::lists::remove_from_favorites,
                commands::lists::is_in_list,
                commands::lists::invoke_list_op,
                commands::catalog::search_catalog,
                commands::catalog::top_catalog,
                commands::catalog::get_catalog_record
            ])
            .build(tauri::generate_context!())
            .expect("error while building tauri application")
            .run(|app_handle, event| {
                if let RunEvent::Exit = event {
                    if let Some(context) = app_handle.try_state::<AppContext>() {
                        tauri::async_runtime::block_on(context.shutdown());
                    }
                }
            });
    }
}
