//! `twin-resolve`: look up an idShort path in a submodel document.
//!
//! Usage:
//!   twin-resolve '<idShort path>'
//!
//! The submodel document is read from stdin as JSON. The element the path
//! resolves to is printed as JSON; an empty path prints the whole submodel
//! back in normalized form.

use std::io::{self, Read, Write};

use twinrepo::{tree, IdShortPath, Submodel};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1) {
        Some(p) => p.clone(),
        None => {
            eprintln!("First argument must be an idShort path.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match resolve(buf.trim(), &path) {
        Ok(result) => {
            io::stdout().write_all(result.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn resolve(doc: &str, raw_path: &str) -> Result<String, String> {
    let submodel: Submodel = serde_json::from_str(doc).map_err(|e| e.to_string())?;
    let path = IdShortPath::parse(raw_path).map_err(|e| e.to_string())?;
    if path.is_root() {
        return serde_json::to_string_pretty(&submodel).map_err(|e| e.to_string());
    }
    let element =
        tree::resolve(&submodel.submodel_elements, &path).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(element).map_err(|e| e.to_string())
}
