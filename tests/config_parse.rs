use gsbatch::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../gsbatch.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.gs.executable, "auto");
    assert_eq!(cfg.defaults.paper, "A4");
    assert!(cfg.defaults.dpi > 0);
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let cfg: Config = toml::from_str("[gs]\nexecutable = \"/usr/bin/gs\"\n").unwrap();
    assert_eq!(cfg.gs.executable, "/usr/bin/gs");
    assert_eq!(cfg.defaults.quality, "ebook");
    assert_eq!(cfg.logging.level, "info");
}
