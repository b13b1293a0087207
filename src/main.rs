#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    #[cfg(target_os = "linux")]
    {
        std::env::set_var("WEBKIT_DISABLE_COMPOSITING_MODE", "1");
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    animark_lib::run()
}
