use recfilter::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RecfilterError> {
    // RUST_LOG=recfilter=trace shows each predicate as it is compiled
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 1. Configure the target table
    let config = CompilerConfig::new("storage", "records");
    let compiler = PostgresCompiler::new(&config)?;

    // 2. Parse a filter document
    let doc = r#"{"$or": [{"id": "route-1"}, {"$index": "10.0.0.1"}]}"#;
    let expr = FilterExpr::from_json_str(doc)?;
    println!("Parsed filter: {:#?}", expr);

    // 3. Compile the filter on its own
    let fragment = compiler.compile(&expr, 0)?;
    println!("Fragment: {}", fragment.query_text());
    println!("Params: {:?}", fragment.params());

    // 4. Embed it in a record listing query
    let query = SelectRecords::new(config.table()?)
        .bind_condition("type", "type.googleapis.com/route")?
        .filter(&compiler, &expr)?
        .limit(100)
        .build();
    println!("Query: {}", query.query_text());
    println!("Params: {:?}", query.params());

    // 5. Unsupported fields are reported, not compiled
    let bad = FilterExpr::equals(["data", "name"], "x");
    match compiler.compile(&bad, 0) {
        Ok(q) => println!("Unexpected: {}", q.query_text()),
        Err(e) => println!("Filter error: {}", e),
    }
    Ok(())
}
