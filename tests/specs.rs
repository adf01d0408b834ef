extern crate teddy;
use teddy::{Config, Engine, TemplateMap, Verbosity, YamlValue};

use std::fs;
use serde::Deserialize;
use serde_yaml::Mapping as YamlMapping;


#[test]
fn variables_test() -> Result<(), String> {
    run_spec_file("variables", false)
}

#[test]
fn conditionals_test() -> Result<(), String> {
    run_spec_file("conditionals", false)
}

#[test]
fn loops_test() -> Result<(), String> {
    run_spec_file("loops", false)
}

#[test]
fn includes_test() -> Result<(), String> {
    run_spec_file("includes", false)
}


fn run_spec_file(name: &str, log: bool) -> Result<(), String> {
    yaml_spec(name)?
        .tests
        .iter()
        .fold(
            Ok(()),
            |acc, test| match (acc, run_spec_test(test, log)) {
                (acc, Ok(())) => acc,
                (Ok(()), Err(err)) => Err(format!("specs ({}): {}", name, err)),
                (Err(err1), Err(err2)) => Err(format!("{}, {}", err1, err2))
            }
        )
}

#[derive(Deserialize, Debug)]
struct YamlSpecFile {
    tests: Vec<YamlTestSpec>,
}

#[derive(Deserialize, Debug)]
struct YamlTestSpec {
    name: String,
    data: YamlValue,
    template: String,
    partials: Option<YamlMapping>,
    expected: String,
}

fn yaml_spec(name: &str) -> Result<YamlSpecFile, String> {
    let path = format!("tests/specs/{}.yml", name);
    let text = fs::read_to_string(path).map_err(
        |err| format!("io: {}", err)
    )?;
    serde_yaml::from_str::<YamlSpecFile>(&text).map_err(
        |err| format!("yaml: {}", err)
    )
}

fn run_spec_test(test: &YamlTestSpec, log: bool) -> Result<(), String> {
    let mut templates = TemplateMap::new();
    templates.insert("main", &test.template);
    if let Some(partials) = &test.partials {
        for (name, text) in partials {
            match (name.as_str(), text.as_str()) {
                (Some(name), Some(text)) => {
                    templates.insert(name, text);
                },
                _ => return Err(format!("{}: invalid partial", test.name))
            }
        }
    }
    let config = Config { verbosity: Verbosity::None, ..Config::default() };
    let engine = Engine::with_source(config, templates);
    let result = engine.render("main", &test.data).map_err(
        |err| format!("{}: {}", test.name, err)
    )?;
    if result != test.expected {
        if log {
            println!("{}: fail", test.name);
            println!("expected:\n{}", test.expected);
            println!("received:\n{}\n", result);
        };
        Err(test.name.clone())
    } else {
        println!("{}: ok", test.name);
        Ok(())
    }
}
