use droplet_core::scheduler::messages::MESSAGES;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    for message in MESSAGES {
        println!("{message}");
    }
    Ok(())
}
