//! End-to-end compilation tests
//!
//! Programs are built either with the AST helpers or from the JSON form an
//! external parser hands over, compiled to the binary container, and read
//! back.

use jsxc::ast::{BinaryOperator, Node, Program};
use jsxc::compiler::{MAGIC, Module, OpCode};
use jsxc::{CompileError, CompilerConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn from_json(json: &str) -> Program {
    serde_json::from_str(json).unwrap()
}

fn read_back(bytes: &[u8]) -> Module {
    Module::from_bytes(bytes).unwrap()
}

fn word(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
}

#[test]
fn test_return_sum_container() {
    init_tracing();
    let program = Program::new(vec![Node::ret(Some(Node::binary(
        BinaryOperator::Add,
        Node::number(1.0),
        Node::number(2.0),
    )))]);

    let bytes = jsxc::compile(&program).unwrap();

    // pushnum, pushnum, add, ret, undefined, ret
    assert_eq!(&bytes[..4], &MAGIC);
    assert_eq!(word(&bytes, 4), 1);
    assert_eq!(word(&bytes, 8), 40);
    assert_eq!(word(&bytes, 12), OpCode::PushNum.code());
    assert_eq!(&bytes[16..24], &1.0f64.to_le_bytes());
    assert_eq!(word(&bytes, 36), OpCode::Add.code());
    assert_eq!(word(&bytes, 40), OpCode::Ret.code());
    assert_eq!(word(&bytes, 44), OpCode::Undefined.code());
    assert_eq!(word(&bytes, 48), OpCode::Ret.code());
    assert_eq!(word(&bytes, 52), 0);
    assert_eq!(bytes.len(), 56);
}

#[test]
fn test_json_program_compiles() {
    init_tracing();
    // function add(a, b) { return a + b; }
    // var total = 0;
    // for (var i = 0; i < 3; i++) { total += add(i, 1); }
    // console.log(total);
    let program = from_json(
        r#"{
        "body": [
            { "type": "Function", "name": "add", "params": ["a", "b"], "body": [
                { "type": "Return", "argument": {
                    "type": "Binary", "operator": "Add", "assign": false,
                    "left": { "type": "Variable", "name": "a" },
                    "right": { "type": "Variable", "name": "b" } } }
            ] },
            { "type": "Declaration", "name": "total", "init": { "type": "Number", "value": 0 } },
            { "type": "ForLoop",
              "init": { "type": "Declaration", "name": "i", "init": { "type": "Number", "value": 0 } },
              "test": { "type": "Binary", "operator": "LessThan", "assign": false,
                        "left": { "type": "Variable", "name": "i" },
                        "right": { "type": "Number", "value": 3 } },
              "update": { "type": "Update", "operator": "Increment", "prefix": false,
                          "argument": { "type": "Variable", "name": "i" } },
              "body": { "type": "Body", "statements": [
                  { "type": "Binary", "operator": "Add", "assign": true,
                    "left": { "type": "Variable", "name": "total" },
                    "right": { "type": "Call",
                               "callee": { "type": "Variable", "name": "add" },
                               "arguments": [ { "type": "Variable", "name": "i" },
                                              { "type": "Number", "value": 1 } ] } }
              ] } },
            { "type": "Call",
              "callee": { "type": "Member", "object": { "type": "Variable", "name": "console" }, "property": "log" },
              "arguments": [ { "type": "Variable", "name": "total" } ] }
        ]
    }"#,
    );

    let bytes = jsxc::compile(&program).unwrap();
    let module = read_back(&bytes);

    assert_eq!(module.sections.len(), 2);
    assert_eq!(module.strings, vec!["add", "total", "i", "console", "log"]);

    let root = module.instructions(0).unwrap();
    assert_eq!(root[0].opcode, OpCode::Close);
    assert_eq!(root[0].operands, vec![1]);
    assert!(root.iter().any(|inst| inst.opcode == OpCode::MethCall));

    let body = module.instructions(1).unwrap();
    let ops: Vec<OpCode> = body.iter().map(|inst| inst.opcode).collect();
    assert_eq!(
        ops,
        vec![
            OpCode::SetCallee,
            OpCode::SetArg,
            OpCode::SetArg,
            OpCode::PushVar,
            OpCode::PushVar,
            OpCode::Add,
            OpCode::Ret,
            OpCode::Undefined,
            OpCode::Ret,
        ]
    );
}

#[test]
fn test_every_jump_lands_on_an_instruction() {
    let program = from_json(
        r#"{
        "body": [
            { "type": "While", "test": { "type": "Variable", "name": "go" }, "body": { "type": "Body", "statements": [
                { "type": "If", "test": { "type": "Variable", "name": "done" },
                  "consequent": { "type": "Break" },
                  "alternate": { "type": "Continue" } },
                { "type": "Logical", "operator": "Or",
                  "left": { "type": "Variable", "name": "a" },
                  "right": { "type": "Conditional",
                             "test": { "type": "True" },
                             "consequent": { "type": "Null" },
                             "alternate": { "type": "Undefined" } } }
            ] } }
        ]
    }"#,
    );

    let module = read_back(&jsxc::compile(&program).unwrap());
    for section in 0..module.sections.len() {
        let instructions = module.instructions(section).unwrap();
        let starts: Vec<u32> = instructions.iter().map(|inst| inst.offset).collect();
        for inst in instructions.iter().filter(|inst| inst.opcode.is_jump()) {
            let target = inst.operands[0];
            assert!(
                starts.contains(&target),
                "{} at {} targets {}",
                inst.opcode.name(),
                inst.offset,
                target
            );
        }
    }
}

#[test]
fn test_compilation_is_deterministic() {
    let json = r#"{
        "body": [
            { "type": "Function", "name": "f", "params": ["x"], "body": [
                { "type": "Function", "name": "g", "body": [
                    { "type": "Return", "argument": { "type": "Variable", "name": "x" } } ] },
                { "type": "Return", "argument": { "type": "Call",
                    "callee": { "type": "Variable", "name": "g" }, "arguments": [] } }
            ] },
            { "type": "Call", "callee": { "type": "Variable", "name": "f" },
              "arguments": [ { "type": "String", "value": "s" } ] }
        ]
    }"#;

    let first = jsxc::compile(&from_json(json)).unwrap();
    let second = jsxc::compile(&from_json(json)).unwrap();
    assert_eq!(first, second);
    assert_eq!(read_back(&first).sections.len(), 3);
}

#[test]
fn test_errors_produce_no_output() {
    let program = from_json(
        r#"{
        "body": [
            { "type": "Declaration", "name": "ok", "init": { "type": "Number", "value": 1 } },
            { "type": "Unsupported", "kind": "TryStatement" }
        ]
    }"#,
    );

    let err = jsxc::compile(&program).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnsupportedConstruct {
            kind: "TryStatement".into()
        }
    );
    assert_eq!(err.to_string(), "unsupported construct: TryStatement");
}

#[test]
fn test_bad_assignment_target_message() {
    let program = Program::new(vec![Node::assign(Node::number(1.0), Node::number(2.0))]);
    let err = jsxc::compile(&program).unwrap_err();
    assert_eq!(err.to_string(), "bad assignment target: Number");
}

#[test]
fn test_config_from_toml_limits_depth() {
    let config = CompilerConfig::from_toml_str("max_depth = 4").unwrap();

    let mut expr = Node::number(0.0);
    for _ in 0..8 {
        expr = Node::binary(BinaryOperator::Add, expr, Node::number(1.0));
    }
    let program = Program::new(vec![expr]);

    let err = jsxc::compile_with(&program, &config).unwrap_err();
    assert_eq!(err, CompileError::NestingTooDeep { limit: 4 });
    assert!(jsxc::compile(&program).is_ok());
}

fn string_chain(terms: usize) -> Program {
    let mut expr = Node::string("s0");
    for i in 1..terms {
        expr = Node::binary(BinaryOperator::Add, expr, Node::string(format!("s{}", i)));
    }
    Program::new(vec![expr])
}

#[test]
fn test_long_concatenation_with_default_config() {
    // "s0" + "s1" + ... + "s1499";
    let module = read_back(&jsxc::compile(&string_chain(1500)).unwrap());

    assert_eq!(module.strings.len(), 1500);
    let ops: Vec<OpCode> = module
        .instructions(0)
        .unwrap()
        .into_iter()
        .map(|inst| inst.opcode)
        .collect();
    assert_eq!(ops.iter().filter(|&&op| op == OpCode::PushStr).count(), 1500);
    assert_eq!(ops.iter().filter(|&&op| op == OpCode::Add).count(), 1499);
    assert_eq!(ops[ops.len() - 3..], [OpCode::Pop, OpCode::Undefined, OpCode::Ret]);
}

#[test]
fn test_deep_nesting_beyond_thread_stack_still_compiles() {
    // Far deeper than the test thread's stack could hold without growth.
    let config = CompilerConfig::default().with_max_depth(100_000);
    let program = string_chain(20_000);
    let bytes = jsxc::compile_with(&program, &config).unwrap();
    assert_eq!(read_back(&bytes).strings.len(), 20_000);
    // Dropping the tree recurses once per level too.
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || drop(program))
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_nesting_past_default_limit_is_an_error() {
    let mut statement = Node::Break;
    for _ in 0..jsxc::config::DEFAULT_MAX_DEPTH {
        statement = Node::body(vec![statement]);
    }
    let program = Program::new(vec![statement]);

    let err = jsxc::compile(&program).unwrap_err();
    assert_eq!(
        err,
        CompileError::NestingTooDeep {
            limit: jsxc::config::DEFAULT_MAX_DEPTH
        }
    );
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || drop(program))
        .unwrap()
        .join()
        .unwrap();
}
