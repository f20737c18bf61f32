use convoflow::{ChannelEvent, ChannelOptions, Config, EngineBuilder, FlowModel, Turn, UserInput};
use tracing_subscriber::EnvFilter;

fn print_turn(turn: &Turn) {
    for step in turn.steps() {
        match (&step.output, &step.error) {
            (_, Some(error)) => println!("  [{}] error: {}", step.node_id.as_deref().unwrap_or("-"), error),
            (Some(output), None) => match output.text() {
                Some(text) => println!("  [{}] {}: {}", step.node_id.as_deref().unwrap_or("-"), output.kind(), text),
                None => println!("  [{}] {}", step.node_id.as_deref().unwrap_or("-"), output.kind()),
            },
            (None, None) => {}
        }
    }
}

#[tokio::main]
async fn main() -> convoflow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("convoflow=info,warn")))
        .init();

    let config = Config::load_from_str(include_str!("./config.toml"))?;
    let engine = EngineBuilder::new().config(config).build()?;

    let model = FlowModel::from_json(include_str!("./flow.json"))?;
    let flow = engine.deploy(&model)?;
    println!("{}", flow.schema());

    let sid = engine.create_session(&model.id, "demo-user")?;

    ChannelEvent::channel(engine.channel(), ChannelOptions::with_sid(sid.clone()))?.on_finished(move |sid| {
        println!("Session finished, sid: {}", sid);
    });
    ChannelEvent::channel(engine.channel(), ChannelOptions::with_sid(sid.clone()))?.on_error(move |e| {
        println!("Session failed: {:?}", e.event);
    });

    println!("> start");
    let mut turn = engine.start(&sid).await?;
    print_turn(&turn);

    let answers = [UserInput::text(""), UserInput::text("Ada"), UserInput::text("36"), UserInput::choice(1)];
    for answer in answers {
        if !turn.requires_input() {
            break;
        }
        println!("> {}", answer.to_value());
        turn = engine.resume(&sid, Some(answer)).await?;
        print_turn(&turn);
    }

    if let Some(session) = engine.session(&sid) {
        let session = session.lock().await;
        println!("State: {}", session.state());
        println!("Variables: {:#?}", serde_json::to_value(session.variables())?);
        println!("History entries: {}", session.history().len());
    }

    Ok(())
}
