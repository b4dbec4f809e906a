use kafka_bridge::app;

fn main() {
    app::startup::startup();
}
