// Driver for the option scanner, used by the integration tests.
//
// Environment:
//   TEST_OPTS_RC         config file to read aliases/execs from
//   TEST_OPTS_EXEC_PATH  directory exec scripts are looked up in
//   TEST_OPTS_STUFF      extra arguments scanned before the command line

use argstack::*;

const NAME: &str = "test-opts";

fn main() {
    let table = OptionTable::new()
        .option(Opt::new("arg1"))
        .option(
            Opt::new("arg2")
                .short('2')
                .arg_type(ArgType::String)
                .default_val("(none)"),
        )
        .option(Opt::new("arg3").short('3').arg_type(ArgType::Int).set_val('3' as i32))
        .option(Opt::new("big").arg_type(ArgType::Long))
        .option(Opt::new("shortoption").short('s'))
        .option(Opt::new("").short('v').set_val('v' as i32));

    let code = match run(&table) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            2
        }
    };
    std::process::exit(code);
}

fn run(table: &OptionTable) -> std::result::Result<(), String> {
    let mut builder = Context::builder(table).name(NAME);
    if let Ok(rc) = std::env::var("TEST_OPTS_RC") {
        builder = builder.config_file(rc);
    }
    if let Ok(dir) = std::env::var("TEST_OPTS_EXEC_PATH") {
        builder = builder.exec_path(&dir, false);
    }
    let mut ctx = builder.build().map_err(|e| format!("{}: {}", NAME, e))?;

    if let Ok(stuff) = std::env::var("TEST_OPTS_STUFF") {
        let args = parse_argv_string(&stuff)
            .map_err(|e| format!("{}: TEST_OPTS_STUFF: {}", NAME, e))?;
        ctx.stuff_args(args).map_err(|e| format!("{}: {}", NAME, e))?;
    }

    let mut verbose = 0;
    loop {
        match ctx.next_opt() {
            Ok(Some(c)) if c == 'v' as i32 => verbose += 1,
            Ok(Some(c)) if c == '3' as i32 => {
                println!("arg3 seen: {}", ctx.get_opt_arg().unwrap_or_default());
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                return Err(format!(
                    "{}: bad argument {}: {}",
                    NAME,
                    ctx.bad_option(true).unwrap_or(""),
                    e
                ));
            }
        }
    }

    let arg1 = ctx.get::<bool>("arg1").unwrap_or(false);
    let arg2 = ctx.get::<String>("arg2").map_err(|e| e.to_string())?;
    println!("arg1: {} arg2: {}", i32::from(arg1), arg2);
    if let Ok(n) = ctx.get::<i32>("arg3") {
        println!("arg3: {}", n);
    }
    if let Ok(n) = ctx.get::<i64>("big") {
        println!("big: {}", n);
    }
    if ctx.is_present("shortoption") {
        println!("shortoption: 1");
    }
    if verbose > 0 {
        println!("verbose: {}", verbose);
    }
    println!("final: {}", ctx.final_argv().join(" "));
    if !ctx.get_args().is_empty() {
        println!("rest: {}", ctx.get_args().join(" "));
    }
    Ok(())
}
