pub mod pml;
use crate::core::Parser;
use crate::pml::ReaderOptions;
use std::{collections::HashMap, sync::Arc};

pub type ParserRegistry = HashMap<&'static str, Arc<dyn Parser>>;

pub fn build_registry() -> ParserRegistry {
    build_registry_with_options(ReaderOptions::default())
}

/// Registry whose event parser decodes events according to `options`.
pub fn build_registry_with_options(options: ReaderOptions) -> ParserRegistry {
    let mut m: ParserRegistry = HashMap::new();

    m.insert(
        "windows_pml",
        Arc::new(pml::WindowsPmlParser::default().options(options)) as Arc<dyn Parser>,
    );

    m.insert(
        "windows_pml_processes",
        Arc::new(pml::WindowsPmlProcessesParser) as Arc<dyn Parser>,
    );

    m.insert(
        "windows_pml_system",
        Arc::new(pml::WindowsPmlSystemParser) as Arc<dyn Parser>,
    );

    m
}
