fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Build scripts run on the host; only embed resources for Windows targets.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("windows") {
        return;
    }

    let mut res = winres::WindowsResource::new();
    res.set("FileDescription", "GLPI Agent Monitor")
        .set("ProductName", "GLPI Agent Monitor")
        .set("OriginalFilename", "glpi-agent-monitor.exe");
    if let Err(e) = res.compile() {
        println!("cargo:warning=embedding version resource failed: {e}");
    }
}
