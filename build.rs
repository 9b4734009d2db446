fn main() {
    // Build-time configuration overrides (see `config::StationConfig::default`).
    for var in [
        "BIOVOTE_WIFI_SSID",
        "BIOVOTE_WIFI_PASSWORD",
        "BIOVOTE_SERVER_URL",
        "BIOVOTE_API_KEY",
        "BIOVOTE_BEARER_TOKEN",
        "BIOVOTE_DEVICE_ID",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
