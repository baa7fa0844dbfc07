use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Laundry booking bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Set the display name used in the table")]
    Name { name: String },
    #[command(description = "Show the booking table")]
    Table,
    #[command(description = "Manage your active bookings")]
    Bookings,
}
