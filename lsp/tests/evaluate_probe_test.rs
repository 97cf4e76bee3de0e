use std::fs;

use rotoscope_lsp::evaluate_probe;
use tempfile::tempdir;

const TRACE: &str = "entity,method_name,method_level,filepath,lineno,caller_entity,caller_method_name,caller_method_level\n\
                     Dog,new,class,dog.rb,19,<ROOT>,,\n\
                     Dog,bark,instance,dog.rb,20,<ROOT>,,\n\
                     Noisemaker,speak,class,dog.rb,5,Dog,bark,instance\n\
                     Kernel,puts,instance,dog.rb,11,Noisemaker,speak,class\n";

const DOG_RB: &str = "require 'rotoscope'

class Dog
  def bark
    Noisemaker.speak('woof!')
  end
end

class Noisemaker
  def self.speak(str)
    puts(str)
  end
end

log_file = File.expand_path('.rotoscope')
puts \"Writing to #{log_file}...\"

Rotoscope.trace(log_file, flatten: true) do
  dog1 = Dog.new
  dog1.bark
end
";

fn write_project() -> tempfile::TempDir {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join(".rotoscope"), TRACE).expect("write trace");
    fs::write(dir.path().join("dog.rb"), DOG_RB).expect("write source");
    dir
}

#[test]
fn test_probe_method_call() {
    let dir = write_project();
    let out = evaluate_probe(&dir.path().join(".rotoscope"), &dir.path().join("dog.rb"), 19, 8).unwrap();

    assert_eq!(out["filepath"], "dog.rb");
    assert_eq!(out["trace"]["rows"], 4);
    assert_eq!(out["token"]["name"], "bark");
    assert!(out["probe"].is_null());
    assert_eq!(out["evaluations"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(out["evaluations"][0]["kind"], "method");
    assert_eq!(out["evaluations"][0]["entity"], "Dog");
    assert_eq!(out["evaluations"][0]["caller_entity"], "<ROOT>");
}

#[test]
fn test_probe_receiver_of_constructor() {
    let dir = write_project();
    // cursor on `Dog` in `dog1 = Dog.new`
    let out = evaluate_probe(&dir.path().join(".rotoscope"), &dir.path().join("dog.rb"), 18, 10).unwrap();

    assert_eq!(out["token"]["name"], "Dog");
    assert_eq!(out["probe"]["name"], "new");
    assert_eq!(out["evaluations"][0]["kind"], "class");
    assert_eq!(out["evaluations"][0]["name"], "Dog");
}

#[test]
fn test_probe_call_with_parenthesised_arguments() {
    let dir = write_project();
    let out = evaluate_probe(&dir.path().join(".rotoscope"), &dir.path().join("dog.rb"), 10, 5).unwrap();

    assert_eq!(out["token"]["name"], "puts");
    assert_eq!(out["evaluations"][0]["entity"], "Kernel");
    assert_eq!(out["evaluations"][0]["caller_method_name"], "speak");
}

#[test]
fn test_probe_unrecorded_line_is_empty() {
    let dir = write_project();
    let out = evaluate_probe(&dir.path().join(".rotoscope"), &dir.path().join("dog.rb"), 2, 7).unwrap();
    assert_eq!(out["evaluations"], serde_json::json!([]));
}

#[test]
fn test_probe_errors() {
    let dir = write_project();
    let source = dir.path().join("dog.rb");

    let err = evaluate_probe(&dir.path().join("missing.csv"), &source, 0, 0).unwrap_err();
    assert!(format!("{:#}", err).contains("missing.csv"));

    let err = evaluate_probe(&dir.path().join(".rotoscope"), &source, 500, 0).unwrap_err();
    assert!(format!("{:#}", err).contains("no line 500"));
}
