use crate::channel::ReadableLogChannel;
use crate::command::{Command, CommandReader};
use crate::error::TxLogResult;

/// Streams commands off a channel until the tail or the first fatal error.
pub struct CommandIter<'a, C: ReadableLogChannel + ?Sized> {
    reader: CommandReader,
    channel: &'a mut C,
    done: bool,
}

impl<'a, C: ReadableLogChannel + ?Sized> CommandIter<'a, C> {
    pub(crate) fn new(reader: CommandReader, channel: &'a mut C) -> Self {
        Self {
            reader,
            channel,
            done: false,
        }
    }
}

impl<C: ReadableLogChannel + ?Sized> Iterator for CommandIter<'_, C> {
    type Item = TxLogResult<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read(&mut *self.channel) {
            Ok(Some(command)) => Some(Ok(command)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
