use std::collections::HashMap;
use std::env;
use std::fmt::Write;
use std::path::PathBuf;

const PREFIX: &str = "MOTE_DRIVER_";

fn main() {
    // (Variable, Type, Default value)
    let mut const_config: HashMap<&str, (&str, &str)> = HashMap::from([
        ("LINKADDR_CONF_SIZE", ("usize", "8")),
        ("PACKETBUF_CONF_SIZE", ("usize", "128")),
        ("PACKETBUF_CONF_HDR_SIZE", ("usize", "48")),
        ("RTIMER_CONF_SECOND", ("u32", "32768")),
    ]);

    // Make sure we get rerun if needed
    println!("cargo:rerun-if-changed=build.rs");
    for name in const_config.keys() {
        println!("cargo:rerun-if-env-changed={PREFIX}{name}");
    }

    let mut data = String::new();

    for (var, value) in env::vars() {
        if let Some(name) = var.strip_prefix(PREFIX) {
            // discard from hashmap as a way of consuming the setting
            let Some((_, (ty, _))) = const_config.remove_entry(name) else {
                panic!("Wrong configuration name {name}");
            };

            writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
        }
    }

    // Take the remaining configs and write the default value to the file
    for (name, (ty, value)) in const_config.iter() {
        writeln!(data, "pub const {name}: {ty} = {value};").unwrap();
    }

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap());
    let out_file = out_dir.join("config.rs");
    std::fs::write(out_file, data).unwrap();
}
