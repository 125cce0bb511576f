use crate::error::{GameError, InputError};
use crate::utils::HumanInput;

const MIN_TARGET: i32 = -1;
const MAX_TARGET: i32 = 9;

pub fn parse_target(raw: &str) -> Result<i32, InputError> {
    let trimmed = raw.trim();
    let value: i32 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if (MIN_TARGET..=MAX_TARGET).contains(&value) {
        Ok(value)
    } else {
        Err(InputError::OutOfRange(value))
    }
}

/// Prompts until the human enters a seat number or -1.
pub async fn prompt_target(input: &dyn HumanInput, text: &str) -> Result<i32, GameError> {
    loop {
        let line = input.prompt(text).await?;
        match parse_target(&line) {
            Ok(value) => return Ok(value),
            Err(e) => input.reject(&format!("请输入正确的数字！({})", e)).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_setup::ScriptedInput;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target(" 7 "), Ok(7));
        assert_eq!(parse_target("-1"), Ok(-1));
        assert_eq!(parse_target("10"), Err(InputError::OutOfRange(10)));
        assert_eq!(parse_target("-2"), Err(InputError::OutOfRange(-2)));
        assert_eq!(
            parse_target("seven"),
            Err(InputError::NotANumber("seven".to_string()))
        );
    }

    #[tokio::test]
    async fn test_prompt_target_reprompts_until_valid() {
        let input = ScriptedInput::new(["abc", "12", "3"]);
        let value = prompt_target(&input, "target?").await.unwrap();

        assert_eq!(value, 3);
        assert_eq!(input.prompts().len(), 3);
        assert_eq!(input.rejections().len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_target_stops_when_input_closes() {
        let input = ScriptedInput::new(["x"]);
        let result = prompt_target(&input, "target?").await;
        assert!(matches!(result, Err(GameError::InputClosed)));
    }
}
