fn main() {
    println!("cargo:rerun-if-env-changed=GPIOLINK_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=GPIOLINK_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=GPIOLINK_CONFIG_JSON");

    // ESP-IDF link arguments are only needed for the on-target binary.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
