use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation};

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, PartialEq)]
pub struct FakeI2CMessage {
    pub address: u8,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq)]
pub enum FakeI2CError {
    ReadError,
    WriteError,
}

impl i2c::Error for FakeI2CError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Records successful writes and counts every transfer attempt, failed or not.
pub struct FakeI2C {
    pub messages: Rc<RefCell<Vec<FakeI2CMessage>>>,
    pub message_to_read: Rc<RefCell<FakeI2CMessage>>,
    pub should_fail: Rc<RefCell<bool>>,
    pub transfers: Rc<RefCell<usize>>,
}

impl FakeI2C {
    pub fn new() -> FakeI2C {
        FakeI2C {
            messages: Rc::new(RefCell::new(vec![])),
            message_to_read: Rc::new(RefCell::new(FakeI2CMessage {
                address: 0,
                bytes: vec![],
            })),
            should_fail: Rc::new(RefCell::new(false)),
            transfers: Rc::new(RefCell::new(0)),
        }
    }

    fn read_into(&mut self, address: u8, bytes: &mut [u8]) -> Result<(), FakeI2CError> {
        let message = self.message_to_read.borrow();
        if *self.should_fail.borrow() {
            Err(FakeI2CError::ReadError)
        } else if message.address != address || message.bytes.len() != bytes.len() {
            Err(FakeI2CError::ReadError)
        } else {
            bytes.copy_from_slice(&message.bytes);
            Ok(())
        }
    }

    fn write_from(&mut self, address: u8, bytes: &[u8]) -> Result<(), FakeI2CError> {
        if !*self.should_fail.borrow() {
            self.messages.borrow_mut().push(FakeI2CMessage {
                address,
                bytes: Vec::from(bytes),
            });
            Ok(())
        } else {
            Err(FakeI2CError::WriteError)
        }
    }
}

impl ErrorType for FakeI2C {
    type Error = FakeI2CError;
}

impl I2c for FakeI2C {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), FakeI2CError> {
        for operation in operations {
            *self.transfers.borrow_mut() += 1;
            match operation {
                Operation::Read(bytes) => self.read_into(address, bytes)?,
                Operation::Write(bytes) => self.write_from(address, bytes)?,
            }
        }
        Ok(())
    }
}
